use super::*;
use serde_json::json;

fn bindings(parameter: Value) -> Bindings {
    Bindings::new(parameter)
}

fn eval(expr: &str, parameter: Value) -> Value {
    DefaultEvaluator::new()
        .evaluate(expr, &bindings(parameter))
        .unwrap()
}

fn truthy(expr: &str, parameter: Value) -> bool {
    DefaultEvaluator::new()
        .evaluate_boolean(expr, &bindings(parameter))
        .unwrap()
}

// ==================== literals & access ====================

#[test]
fn literals() {
    assert_eq!(eval("null", json!({})), json!(null));
    assert_eq!(eval("true", json!({})), json!(true));
    assert_eq!(eval("42", json!({})), json!(42));
    assert_eq!(eval("1.5", json!({})), json!(1.5));
    assert_eq!(eval("'it\\'s'", json!({})), json!("it's"));
    assert_eq!(eval("\"x\"", json!({})), json!("x"));
    assert_eq!(eval("{1, 'a', null}", json!({})), json!([1, "a", null]));
    assert_eq!(eval("10L", json!({})), json!(10));
}

#[test]
fn property_and_index_access() {
    let p = json!({"user": {"name": "ann", "tags": ["a", "b"]}, "m": {"k": 7}});
    assert_eq!(eval("user.name", p.clone()), json!("ann"));
    assert_eq!(eval("user.tags[1]", p.clone()), json!("b"));
    assert_eq!(eval("user.tags[5]", p.clone()), json!(null));
    assert_eq!(eval("m['k']", p.clone()), json!(7));
    assert_eq!(eval("user.missing", p), json!(null));
}

#[test]
fn explicit_bindings_shadow_the_parameter() {
    let mut b = bindings(json!({"name": "param"}));
    b.insert("name", json!("bound"));
    let v = DefaultEvaluator::new().evaluate("name", &b).unwrap();
    assert_eq!(v, json!("bound"));
}

#[test]
fn scalar_parameter_answers_any_name() {
    assert_eq!(eval("id", json!(5)), json!(5));
    assert!(truthy("anything != null", json!("x")));
}

#[test]
fn unbound_name_is_an_error() {
    for parameter in [Value::Null, json!([1, 2])] {
        let err = DefaultEvaluator::new()
            .evaluate("missing", &bindings(parameter))
            .unwrap_err();
        assert!(err.is_evaluation());
        assert!(err.to_string().contains("missing"));
    }
}

#[test]
fn absent_field_of_an_object_parameter_is_null() {
    assert_eq!(eval("missing", json!({"id": 1})), json!(null));
    assert!(truthy("title == null", json!({})));
}

#[test]
fn member_access_on_null_is_an_error() {
    let err = DefaultEvaluator::new()
        .evaluate("user.name", &bindings(json!({"user": null})))
        .unwrap_err();
    assert!(err.is_evaluation());
}

// ==================== operators ====================

#[test]
fn comparisons() {
    let p = json!({"age": 30, "name": "bob", "code": "5"});
    assert!(truthy("age > 18", p.clone()));
    assert!(truthy("age gte 30", p.clone()));
    assert!(!truthy("age lt 30", p.clone()));
    assert!(truthy("name == 'bob'", p.clone()));
    assert!(truthy("name neq 'al'", p.clone()));
    assert!(truthy("code == 5", p.clone()));
    assert!(truthy("age == 30.0", p.clone()));
    assert!(truthy("'a' < 'b'", p));
}

#[test]
fn null_comparisons() {
    let p = json!({"a": null, "b": 1});
    assert!(truthy("a == null", p.clone()));
    assert!(truthy("b != null", p.clone()));
    assert!(!truthy("a != null", p));
}

#[test]
fn logical_operators_short_circuit() {
    let p = json!({"a": null});
    // `a.b` would fail on null; the left side decides first.
    assert!(!truthy("a != null and a.b == 1", p.clone()));
    assert!(truthy("a == null || a.b == 1", p.clone()));
    assert!(truthy("not (a != null)", p.clone()));
    assert!(truthy("!false && true", p));
}

#[test]
fn precedence() {
    assert_eq!(eval("1 + 2 * 3", json!({})), json!(7));
    assert_eq!(eval("(1 + 2) * 3", json!({})), json!(9));
    assert_eq!(eval("10 - 4 - 3", json!({})), json!(3));
    assert!(truthy("1 + 1 == 2 and 3 > 2 or false", json!({})));
    assert_eq!(eval("-2 * 3", json!({})), json!(-6));
}

#[test]
fn arithmetic() {
    assert_eq!(eval("7 / 2", json!({})), json!(3));
    assert_eq!(eval("7 % 4", json!({})), json!(3));
    assert_eq!(eval("7.0 / 2", json!({})), json!(3.5));
    assert_eq!(eval("'id_' + 3", json!({})), json!("id_3"));

    let evaluator = DefaultEvaluator::new();
    let b = bindings(json!({}));
    assert!(evaluator.evaluate("1 / 0", &b).unwrap_err().is_evaluation());
    assert!(
        evaluator
            .evaluate("9223372036854775807 + 1", &b)
            .unwrap_err()
            .is_evaluation()
    );
    assert!(evaluator.evaluate("true * 2", &b).unwrap_err().is_evaluation());
}

#[test]
fn methods() {
    let p = json!({"name": "  Ann ", "ids": [1, 2, 3], "m": {"a": 1}, "e": ""});
    assert_eq!(eval("name.trim()", p.clone()), json!("Ann"));
    assert_eq!(eval("name.trim().toUpperCase()", p.clone()), json!("ANN"));
    assert_eq!(eval("ids.size()", p.clone()), json!(3));
    assert_eq!(eval("m.size()", p.clone()), json!(1));
    assert!(truthy("e.isEmpty()", p.clone()));
    assert!(truthy("ids.contains(2)", p.clone()));
    assert!(truthy("m.containsKey('a')", p.clone()));
    assert!(truthy("name.trim().startsWith('A')", p.clone()));
    assert!(truthy("ids.size() > 0 and !e.isEmpty() == false", p.clone()));
    assert_eq!(eval("ids[0].toString()", p), json!("1"));
}

#[test]
fn unknown_method_is_an_error() {
    let err = DefaultEvaluator::new()
        .evaluate("ids.frobnicate()", &bindings(json!({"ids": []})))
        .unwrap_err();
    assert!(err.is_evaluation());
}

// ==================== truthiness ====================

#[test]
fn truthiness() {
    assert!(!is_truthy(&json!(null)));
    assert!(!is_truthy(&json!(false)));
    assert!(!is_truthy(&json!(0)));
    assert!(!is_truthy(&json!(0.0)));
    assert!(is_truthy(&json!(-1)));
    assert!(is_truthy(&json!("")));
    assert!(is_truthy(&json!([])));
    assert!(is_truthy(&json!({})));
}

// ==================== iterables ====================

#[test]
fn iterates_lists_with_positions() {
    let els = DefaultEvaluator::new()
        .evaluate_iterable("ids", &bindings(json!({"ids": ["a", "b"]})), false)
        .unwrap();
    assert_eq!(
        els,
        vec![
            LoopElement {
                index: json!(0),
                item: json!("a")
            },
            LoopElement {
                index: json!(1),
                item: json!("b")
            },
        ]
    );
}

#[test]
fn iterates_maps_with_keys() {
    let els = DefaultEvaluator::new()
        .evaluate_iterable("m", &bindings(json!({"m": {"x": 1, "y": 2}})), false)
        .unwrap();
    let keys: Vec<_> = els.iter().map(|e| e.index.clone()).collect();
    assert_eq!(keys, vec![json!("x"), json!("y")]);
    assert_eq!(els[1].item, json!(2));
}

#[test]
fn null_collection_depends_on_nullable() {
    let evaluator = DefaultEvaluator::new();
    let b = bindings(json!({"ids": null}));
    assert!(evaluator.evaluate_iterable("ids", &b, true).unwrap().is_empty());
    assert!(
        evaluator
            .evaluate_iterable("ids", &b, false)
            .unwrap_err()
            .is_evaluation()
    );
}

#[test]
fn scalars_are_not_iterable() {
    let err = DefaultEvaluator::new()
        .evaluate_iterable("n", &bindings(json!({"n": 3})), true)
        .unwrap_err();
    assert!(err.to_string().contains("not iterable"));
}

// ==================== syntax & cache ====================

#[test]
fn syntax_errors() {
    let evaluator = DefaultEvaluator::new();
    for bad in ["", "a ==", "(a", "a.", "'open", "a # b", "a b", "{1, 2"] {
        assert!(evaluator.validate(bad).unwrap_err().is_evaluation(), "{bad}");
    }
}

#[test]
fn parsed_expressions_are_cached() {
    let evaluator = DefaultEvaluator::with_cache_capacity(2);
    let b = bindings(json!({"a": 1}));
    evaluator.evaluate("a + 1", &b).unwrap();
    evaluator.evaluate("a + 1", &b).unwrap();
    assert_eq!(evaluator.cached_len(), 1);

    evaluator.evaluate("a + 2", &b).unwrap();
    evaluator.evaluate("a + 3", &b).unwrap();
    assert_eq!(evaluator.cached_len(), 2);
}

#[test]
fn zero_capacity_disables_caching() {
    let evaluator = DefaultEvaluator::with_cache_capacity(0);
    evaluator.evaluate("1", &bindings(json!({}))).unwrap();
    assert_eq!(evaluator.cached_len(), 0);
    assert_eq!(evaluator.cache_capacity(), 0);
}
