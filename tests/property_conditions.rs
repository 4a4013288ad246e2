use std::collections::BTreeMap;

use xtdb_query::catalog::TypeKeeper;
use xtdb_query::condition::{build_property_conditions, combine};
use xtdb_query::construct::{Condition, DOC_ID};
use xtdb_query::datatype::{EnumValue, InstancePropertyValue};
use xtdb_query::error::QueryError;
use xtdb_query::keyword::Namespace;
use xtdb_query::pattern::contains_regex;
use xtdb_query::search::{ComparisonOperator, MatchCriteria, PropertyCondition, SearchProperties};
use xtdb_query::text::BuildOptions;

use ComparisonOperator::*;

fn setup() -> TypeKeeper {
    TypeKeeper::from_json(include_str!("types.json")).expect("fixture types")
}

fn candidates(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn try_build(
    keeper: &TypeKeeper,
    types: &[&str],
    criteria: MatchCriteria,
    conditions: Vec<PropertyCondition>,
    wrap_in_group: bool,
) -> Result<Vec<Condition>, QueryError> {
    let search = SearchProperties::new(criteria, conditions);
    let built = build_property_conditions(
        Some(&search),
        &Namespace::entity(),
        wrap_in_group,
        &candidates(types),
        keeper,
        BuildOptions::default(),
        &DOC_ID,
    )?;
    Ok(built.expect("present search properties build conditions"))
}

fn build(keeper: &TypeKeeper, types: &[&str], criteria: MatchCriteria, conditions: Vec<PropertyCondition>) -> Vec<String> {
    try_build(keeper, types, criteria, conditions, false)
        .expect("conditions build")
        .iter()
        .map(|c| c.to_string())
        .collect()
}

fn qualified_name(op: ComparisonOperator, value: InstancePropertyValue) -> PropertyCondition {
    PropertyCondition::leaf("qualifiedName", op, value)
}

#[test]
fn absent_search_properties_add_nothing() {
    let keeper = setup();
    let built = build_property_conditions(
        None,
        &Namespace::entity(),
        false,
        &candidates(&["Asset"]),
        &keeper,
        BuildOptions::default(),
        &DOC_ID,
    )
    .expect("no error");
    assert!(built.is_none());
}

#[test]
fn equality_on_unambiguous_property_is_one_triple() {
    let keeper = setup();
    let built = build(&keeper, &["Referenceable"], MatchCriteria::All, vec![qualified_name(Eq, InstancePropertyValue::string("a-qualified-name"))]);
    assert_eq!(built, vec!["[e :entityProperties/Referenceable.qualifiedName.value \"a-qualified-name\"]"]);

    let built = build(&keeper, &["Process"], MatchCriteria::Any, vec![PropertyCondition::leaf("stepCount", Eq, InstancePropertyValue::int(3))]);
    assert_eq!(built, vec!["[e :entityProperties/Process.stepCount.value 3]"]);
}

#[test]
fn inequality_binds_then_compares() {
    let keeper = setup();
    let built = build(&keeper, &["Referenceable"], MatchCriteria::All, vec![qualified_name(Neq, InstancePropertyValue::string("a-qualified-name"))]);
    assert_eq!(
        built,
        vec![
            "[e :entityProperties/Referenceable.qualifiedName.value v_qualifiedName]",
            "[(not= v_qualifiedName \"a-qualified-name\")]",
        ]
    );
    let built = build(&keeper, &["Process"], MatchCriteria::All, vec![PropertyCondition::leaf("stepCount", Gte, InstancePropertyValue::int(2))]);
    assert_eq!(built[1], "[(>= v_stepCount 2)]");
}

#[test]
fn in_operator_builds_a_set() {
    let keeper = setup();
    let built = build(&keeper, &["Referenceable"], MatchCriteria::All, vec![qualified_name(In, InstancePropertyValue::strings(["one", "two"]))]);
    assert_eq!(
        built,
        vec![
            "[e :entityProperties/Referenceable.qualifiedName.value v_qualifiedName]",
            "[(hash-set \"one\" \"two\") set_qualifiedName]",
            "[(contains? set_qualifiedName v_qualifiedName)]",
        ]
    );
}

#[test]
fn contains_search_uses_string_predicate() {
    let keeper = setup();
    let built = build(&keeper, &["Referenceable"], MatchCriteria::All, vec![qualified_name(Like, InstancePropertyValue::string(contains_regex("name", false)))]);
    assert_eq!(built.len(), 3);
    assert_eq!(built[1], "[(str v_qualifiedName) s_qualifiedName]");
    assert_eq!(built[2], "[(includes? s_qualifiedName \"name\")]");
}

#[test]
fn ambiguous_property_fans_out() {
    let keeper = setup();
    let built = build(&keeper, &["DataSet", "GlossaryTerm"], MatchCriteria::Any, vec![PropertyCondition::leaf("description", Eq, InstancePropertyValue::string("x"))]);
    assert_eq!(
        built,
        vec!["(or [e :entityProperties/Asset.description.value \"x\"] [e :entityProperties/GlossaryTerm.description.value \"x\"])"]
    );

    let built = build(&keeper, &["Asset", "GlossaryTerm"], MatchCriteria::All, vec![PropertyCondition::leaf("description", Neq, InstancePropertyValue::string("x"))]);
    assert_eq!(
        built,
        vec![
            "(or-join [e] (and [e :entityProperties/Asset.description.value v_description] [(not= v_description \"x\")]) \
             (and [e :entityProperties/GlossaryTerm.description.value v_description_2] [(not= v_description_2 \"x\")]))"
        ]
    );
}

#[test]
fn values_never_narrow_ambiguity() {
    let keeper = setup();
    // owner is a string on Asset but an int on Process
    let built = build(&keeper, &["DataSet", "Process"], MatchCriteria::All, vec![PropertyCondition::leaf("owner", Eq, InstancePropertyValue::string("x"))]);
    assert_eq!(
        built,
        vec!["(or [e :entityProperties/Asset.owner.value \"x\"] [e :entityProperties/Process.owner.value \"x\"])"]
    );
    let built = build(&keeper, &["DataSet", "Process"], MatchCriteria::All, vec![PropertyCondition::leaf("owner", Eq, InstancePropertyValue::int(5))]);
    assert_eq!(
        built,
        vec!["(or [e :entityProperties/Asset.owner.value 5] [e :entityProperties/Process.owner.value 5])"]
    );
}

#[test]
fn enums_match_by_symbolic_name() {
    let keeper = setup();
    let search = SearchProperties::new(
        MatchCriteria::All,
        vec![PropertyCondition::leaf("status", Eq, InstancePropertyValue::string("Proposed"))],
    );
    let built = build_property_conditions(
        Some(&search),
        &Namespace::relationship(),
        false,
        &candidates(&["SemanticAssignment"]),
        &keeper,
        BuildOptions::default(),
        &DOC_ID,
    )
    .expect("enum by name")
    .expect("present");
    assert_eq!(
        built.iter().map(|c| c.to_string()).collect::<Vec<_>>(),
        vec!["[e :relationshipProperties/SemanticAssignment.status.value \"Proposed\"]"]
    );
}

#[test]
fn unknown_property_matches_nothing() {
    let keeper = setup();
    for op in [Eq, Neq, Lt, In, Like, IsNull, NotNull] {
        let built = build(
            &keeper,
            &["Asset"],
            MatchCriteria::All,
            vec![PropertyCondition::leaf("imaginary-property", op, InstancePropertyValue::string("x"))],
        );
        assert_eq!(built, vec!["[e :type.category -1]"], "{:?}", op);
    }
}

#[test]
fn header_properties_are_not_qualified() {
    let keeper = setup();
    let built = build(&keeper, &["GlossaryTerm"], MatchCriteria::All, vec![PropertyCondition::leaf("createdBy", Eq, InstancePropertyValue::string("garygeeke"))]);
    assert_eq!(built, vec!["[e :createdBy \"garygeeke\"]"]);
    // version is also declared by GlossaryTerm, the header wins
    let built = build(&keeper, &["GlossaryTerm"], MatchCriteria::All, vec![PropertyCondition::leaf("version", Gt, InstancePropertyValue::long(4))]);
    assert_eq!(built, vec!["[e :version v_version]", "[(> v_version 4)]"]);
}

#[test]
fn none_of_one_condition_is_a_not_join() {
    let keeper = setup();
    let leaf = || vec![qualified_name(Neq, InstancePropertyValue::string("q"))];
    let all = try_build(&keeper, &["Asset"], MatchCriteria::All, leaf(), false).expect("all");
    let none = try_build(&keeper, &["Asset"], MatchCriteria::None, leaf(), false).expect("none");
    assert_eq!(none.len(), 1);
    match &none[0] {
        Condition::NotJoin { bindings, body } => {
            assert_eq!(bindings, &vec![DOC_ID]);
            assert_eq!(body, &all);
        }
        other => panic!("expected a not-join, got {}", other),
    }
}

#[test]
fn all_of_two_conditions_wraps_in_and() {
    let keeper = setup();
    let first = || qualified_name(Eq, InstancePropertyValue::string("q"));
    let second = || PropertyCondition::leaf("name", Eq, InstancePropertyValue::string("n"));
    let single = |c: PropertyCondition| try_build(&keeper, &["Asset"], MatchCriteria::All, vec![c], false).expect("single");
    let wrapped = try_build(&keeper, &["Asset"], MatchCriteria::All, vec![first(), second()], true).expect("wrapped");
    assert_eq!(
        wrapped,
        vec![Condition::And(vec![
            Condition::group(single(first())),
            Condition::group(single(second())),
        ])]
    );
    let flat = try_build(&keeper, &["Asset"], MatchCriteria::All, vec![first(), second()], false).expect("flat");
    assert_eq!(flat.len(), 2);
}

#[test]
fn any_of_two_conditions() {
    let keeper = setup();
    let built = build(
        &keeper,
        &["Asset"],
        MatchCriteria::Any,
        vec![
            qualified_name(Eq, InstancePropertyValue::string("q")),
            PropertyCondition::leaf("name", Eq, InstancePropertyValue::string("n")),
        ],
    );
    assert_eq!(
        built,
        vec!["(or [e :entityProperties/Referenceable.qualifiedName.value \"q\"] [e :entityProperties/Asset.name.value \"n\"])"]
    );
    let built = build(
        &keeper,
        &["Asset"],
        MatchCriteria::Any,
        vec![
            qualified_name(Neq, InstancePropertyValue::string("q")),
            PropertyCondition::leaf("name", Eq, InstancePropertyValue::string("n")),
        ],
    );
    assert_eq!(
        built,
        vec![
            "(or-join [e] (and [e :entityProperties/Referenceable.qualifiedName.value v_qualifiedName] [(not= v_qualifiedName \"q\")]) \
             [e :entityProperties/Asset.name.value \"n\"])"
        ]
    );
}

#[test]
fn none_of_several_negates_the_disjunction() {
    let keeper = setup();
    let built = build(
        &keeper,
        &["Asset"],
        MatchCriteria::None,
        vec![
            qualified_name(Eq, InstancePropertyValue::string("q")),
            PropertyCondition::leaf("name", Eq, InstancePropertyValue::string("n")),
        ],
    );
    assert_eq!(
        built,
        vec!["(not (or [e :entityProperties/Referenceable.qualifiedName.value \"q\"] [e :entityProperties/Asset.name.value \"n\"]))"]
    );
}

#[test]
fn nested_groups_are_one_element() {
    let keeper = setup();
    let owners = SearchProperties::new(
        MatchCriteria::Any,
        vec![
            PropertyCondition::leaf("owner", Eq, InstancePropertyValue::string("x")),
            PropertyCondition::leaf("owner", Eq, InstancePropertyValue::string("y")),
        ],
    );
    let built = build(
        &keeper,
        &["Asset"],
        MatchCriteria::All,
        vec![
            PropertyCondition::leaf("name", Eq, InstancePropertyValue::string("n")),
            PropertyCondition::Nested(owners),
        ],
    );
    assert_eq!(
        built,
        vec![
            "[e :entityProperties/Asset.name.value \"n\"]",
            "(or [e :entityProperties/Asset.owner.value \"x\"] [e :entityProperties/Asset.owner.value \"y\"])",
        ]
    );
}

#[test]
fn null_checks() {
    let keeper = setup();
    let built = build(&keeper, &["Asset"], MatchCriteria::All, vec![PropertyCondition::check("owner", NotNull)]);
    assert_eq!(built, vec!["[e :entityProperties/Asset.owner.value _]"]);
    let built = build(&keeper, &["Asset"], MatchCriteria::All, vec![PropertyCondition::check("owner", IsNull)]);
    assert_eq!(built, vec!["(not-join [e] [e :entityProperties/Asset.owner.value _])"]);
}

#[test]
fn arrays_and_enums() {
    let keeper = setup();
    let built = build(&keeper, &["Asset"], MatchCriteria::All, vec![PropertyCondition::leaf("zoneMembership", Eq, InstancePropertyValue::strings(["quarantine", "trash-can"]))]);
    assert_eq!(
        built,
        vec![
            "[e :entityProperties/Asset.zoneMembership.value \"quarantine\"]",
            "[e :entityProperties/Asset.zoneMembership.value \"trash-can\"]",
        ]
    );
    let search = SearchProperties::new(
        MatchCriteria::All,
        vec![PropertyCondition::leaf(
            "status",
            Eq,
            InstancePropertyValue::Enum(EnumValue { ordinal: 1, symbolic_name: String::from("Proposed") }),
        )],
    );
    let built = build_property_conditions(
        Some(&search),
        &Namespace::relationship(),
        false,
        &candidates(&["SemanticAssignment"]),
        &keeper,
        BuildOptions::default(),
        &DOC_ID,
    )
    .expect("enum")
    .expect("present");
    assert_eq!(built[0].to_string(), "[e :relationshipProperties/SemanticAssignment.status.value 1]");
}

#[test]
fn precondition_violations_are_errors() {
    let keeper = setup();
    let invalid = |types: &[&str], condition: PropertyCondition| {
        match try_build(&keeper, types, MatchCriteria::All, vec![condition], false) {
            Err(QueryError::InvalidCondition(_)) => (),
            other => panic!("expected an invalid condition, got {:?}", other),
        }
    };
    invalid(&["Asset"], qualified_name(In, InstancePropertyValue::string("one")));
    invalid(&["Asset"], PropertyCondition::check("qualifiedName", Eq));
    invalid(&["Process"], PropertyCondition::leaf("stepCount", Like, InstancePropertyValue::int(1)));
    let mut entries = BTreeMap::new();
    entries.insert(String::from("k"), InstancePropertyValue::string("v"));
    invalid(&["Asset"], PropertyCondition::leaf("additionalProperties", Lt, InstancePropertyValue::Map(entries.clone())));
    invalid(&["Asset"], PropertyCondition::leaf("additionalProperties", Eq, InstancePropertyValue::Map(entries)));
}

#[test]
fn building_twice_gives_equal_output() {
    let keeper = setup();
    let conditions = || {
        vec![
            qualified_name(Neq, InstancePropertyValue::string("q")),
            qualified_name(Like, InstancePropertyValue::string(contains_regex("x", true))),
        ]
    };
    let first = try_build(&keeper, &["Asset", "GlossaryTerm"], MatchCriteria::Any, conditions(), true).expect("first");
    let second = try_build(&keeper, &["Asset", "GlossaryTerm"], MatchCriteria::Any, conditions(), true).expect("second");
    assert_eq!(first, second);
}

#[test]
fn combine_is_independent_of_resolution() {
    let a = vec![Condition::triple(&DOC_ID, xtdb_query::keyword::TYPE_CATEGORY, 2_i64)];
    assert!(combine(MatchCriteria::Any, Vec::new(), true, &DOC_ID).is_empty());
    assert_eq!(combine(MatchCriteria::All, vec![a.clone()], true, &DOC_ID), a);
    assert_eq!(
        combine(MatchCriteria::None, vec![a.clone()], false, &DOC_ID)[0].to_string(),
        "(not-join [e] [e :type.category 2])"
    );
}

#[test]
fn empty_groups_take_no_part() {
    let keeper = setup();
    let empty = SearchProperties::new(MatchCriteria::Any, Vec::new());
    let built = build(
        &keeper,
        &["Asset"],
        MatchCriteria::Any,
        vec![
            PropertyCondition::leaf("name", Eq, InstancePropertyValue::string("n")),
            PropertyCondition::Nested(empty),
        ],
    );
    assert_eq!(built, vec!["[e :entityProperties/Asset.name.value \"n\"]"]);
    let a = vec![Condition::triple(&DOC_ID, xtdb_query::keyword::TYPE_CATEGORY, 2_i64)];
    assert_eq!(combine(MatchCriteria::All, vec![Vec::new(), a.clone(), Vec::new()], true, &DOC_ID), a);
    assert!(combine(MatchCriteria::None, vec![Vec::new()], false, &DOC_ID).is_empty());
}
