use super::*;
use crate::{
    foundation::error::TableError,
    pack::templates::{RenderMode, TemplatePack, TemplateParams, keys},
    schema::model::SchemaNode,
};
use serde_json::json;

#[tokio::test]
async fn unknown_template_key_fails_fast() {
    let pack = HtmlPack::new();
    let err = pack
        .render("noSuchTemplate", &TemplateParams::default())
        .await
        .unwrap_err();
    assert!(matches!(err, TableError::Config(_)));
    assert!(err.to_string().contains("noSuchTemplate"));
}

#[tokio::test]
async fn table_open_carries_endpoint_attributes() {
    let pack = HtmlPack::new();
    let params = TemplateParams {
        id: Some("orders".to_string()),
        endpoint: Some("/api/orders".to_string()),
        method: Some("POST".to_string()),
        ..TemplateParams::default()
    };
    let html = pack.render(keys::TABLE_OPEN, &params).await.unwrap();
    assert_eq!(
        html,
        "<table id=\"orders\" class=\"schema-table\" data-endpoint=\"/api/orders\" data-method=\"POST\">"
    );
}

#[tokio::test]
async fn table_item_escapes_interpolated_value() {
    let pack = HtmlPack::new();
    let params = TemplateParams {
        id: Some("note".to_string()),
        name: Some("note".to_string()),
        val: Some(json!("<b>\"x\" & y</b>")),
        ..TemplateParams::default()
    };
    let html = pack.render(keys::TABLE_ITEM, &params).await.unwrap();
    assert!(html.contains("&lt;b&gt;&quot;x&quot; &amp; y&lt;/b&gt;"));
    assert!(!html.contains("<b>"));
}

#[tokio::test]
async fn table_item_renders_empty_cell_without_value() {
    let pack = HtmlPack::new();
    let params = TemplateParams {
        id: Some("note".to_string()),
        name: Some("note".to_string()),
        ..TemplateParams::default()
    };
    let html = pack.render(keys::TABLE_ITEM, &params).await.unwrap();
    assert_eq!(html, "<td id=\"note\" data-name=\"note\"></td>");
}

#[tokio::test]
async fn header_label_falls_back_to_name() {
    let pack = HtmlPack::new();
    let params = TemplateParams {
        id: Some("qty".to_string()),
        name: Some("qty".to_string()),
        ..TemplateParams::default()
    };
    let html = pack.render(keys::TABLE_HEADER, &params).await.unwrap();
    assert!(html.contains(">qty</th>"));
}

#[test]
fn render_mode_is_configurable() {
    assert_eq!(HtmlPack::new().render_mode(), RenderMode::Data);
    assert_eq!(
        HtmlPack::new()
            .with_render_mode(RenderMode::Stamp)
            .render_mode(),
        RenderMode::Stamp
    );
}

#[test]
fn visibility_honors_hidden_option() {
    let pack = HtmlPack::new();
    let visible: SchemaNode = serde_json::from_value(json!({"type": "string"})).unwrap();
    let hidden: SchemaNode =
        serde_json::from_value(json!({"type": "string", "options": {"hidden": true}})).unwrap();
    assert!(pack.is_visible(&visible));
    assert!(!pack.is_visible(&hidden));
}

#[test]
fn escape_html_covers_attribute_characters() {
    assert_eq!(escape_html("a&b<c>\"d\""), "a&amp;b&lt;c&gt;&quot;d&quot;");
    assert_eq!(escape_html("plain"), "plain");
}
