use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::sync::Arc;

use xtdb_query::catalog::TypeKeeper;
use xtdb_query::datatype::InstancePropertyValue;
use xtdb_query::pattern::contains_regex;
use xtdb_query::search::{ComparisonOperator, MatchCriteria, PropertyCondition, SearchProperties, SequencingOrder};
use xtdb_query::text::BuildOptions;
use xtdb_query::translate::{EntitySearch, Paging, Sequencing, TextSearch, Translator};

const ASSET: &str = "896d14c2-7522-4f6c-8519-757711943fe6";

fn translator(options: BuildOptions) -> Translator {
    let keeper = TypeKeeper::from_json(include_str!("../tests/types.json")).expect("fixture types");
    Translator::new(Arc::new(keeper), options, 1000)
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let plain = translator(BuildOptions::default());
    let indexed = translator(BuildOptions {
        optimize_for_index: true,
        case_sensitive: false,
    });

    let everything = EntitySearch::default();
    c.bench_function("entities untyped", |b| b.iter(|| plain.entities(black_box(&everything))));

    let search = EntitySearch {
        entity_type_guid: Some(ASSET.into()),
        match_properties: Some(SearchProperties::new(
            MatchCriteria::Any,
            vec![
                PropertyCondition::leaf("name", ComparisonOperator::Eq, InstancePropertyValue::string("Sales")),
                PropertyCondition::leaf("description", ComparisonOperator::Like, InstancePropertyValue::string(".*ales.*")),
                PropertyCondition::leaf("owner", ComparisonOperator::Neq, InstancePropertyValue::string("nobody")),
            ],
        )),
        sequencing: Sequencing {
            order: Some(SequencingOrder::PropertyAscending),
            property: Some("name".into()),
        },
        paging: Paging {
            from_element: 100,
            page_size: 50,
        },
        ..Default::default()
    };
    c.bench_function("entities with properties", |b| {
        b.iter(|| plain.entities(black_box(&search)).map(|q| q.to_edn()))
    });

    let text = TextSearch {
        search_criteria: contains_regex("Sales", false),
        ..Default::default()
    };
    c.bench_function("text across properties", |b| {
        b.iter(|| plain.text(black_box(&text)).map(|q| q.to_edn()))
    });
    c.bench_function("text from the index", |b| {
        b.iter(|| indexed.text(black_box(&text)).map(|q| q.to_edn()))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
