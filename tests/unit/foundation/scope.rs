use super::*;
use serde_json::json;

#[test]
fn generate_id_is_dom_legal() {
    let id = generate_id("Order[Lines][0].Name x");
    assert_eq!(id, "order--lines--0-name-x");
    assert!(!id.contains('['));
    assert!(!id.contains(']'));
    assert!(!id.contains('.'));
    assert!(!id.contains(' '));
}

#[test]
fn generate_id_preserves_parent_segments() {
    assert_eq!(generate_id("../order.total"), "../order-total");
}

#[test]
fn generate_id_is_idempotent() {
    let once = generate_id("Order[Lines][2][Sku]");
    assert_eq!(generate_id(&once), once);
}

#[test]
fn child_scope_uses_bracket_notation_below_root() {
    assert_eq!(child_scope(None, "order"), "order");
    assert_eq!(child_scope(Some("order"), "lines"), "order[lines]");
}

#[test]
fn dot_syntax_flattens_brackets() {
    assert_eq!(dot_syntax("a[b][0]"), "a.b.0");
    assert_eq!(dot_syntax("a"), "a");
    assert_eq!(dot_syntax("a.b[c]"), "a.b.c");
}

#[test]
fn raw_name_is_last_segment() {
    assert_eq!(raw_name("order[lines][sku]"), "sku");
    assert_eq!(raw_name("order"), "order");
    assert_eq!(raw_name(""), "");
}

#[test]
fn inner_name_strips_first_numeric_bracket() {
    assert_eq!(inner_name("items[0][street]"), "items[street]");
    assert_eq!(inner_name("a[1][2]"), "a[2]");
    assert_eq!(inner_name("plain[name]"), "plain[name]");
    assert_eq!(inner_name("plain"), "plain");
}

#[test]
fn lookup_value_supports_both_path_styles() {
    let data = json!({
        "order": {
            "lines": [
                {"sku": "A-1", "qty": 2},
                {"sku": "B-2", "qty": 1}
            ]
        }
    });

    assert_eq!(
        lookup_value(&data, "order.lines[1].sku"),
        Some(&json!("B-2"))
    );
    assert_eq!(
        lookup_value(&data, "order[lines][0][qty]"),
        Some(&json!(2))
    );
    assert_eq!(lookup_value(&data, "order[missing]"), None);
    assert_eq!(lookup_value(&data, "order.lines[9].sku"), None);
    assert_eq!(lookup_value(&data, ""), None);
}

#[test]
fn lookup_value_rejects_non_numeric_array_index() {
    let data = json!({"xs": [1, 2, 3]});
    assert_eq!(lookup_value(&data, "xs[one]"), None);
}
