use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tandem_engine::paint::Color;
use tandem_engine::scene::Border;
use tandem_engine::text::FontId;
use tandem_mkml::{parse_str, Document, Node};

use crate::constraints::Edges;
use crate::dsl::error::LoadError;
use crate::image::{ImageStore, Size};
use crate::state::UiState;
use crate::widget::Element;
use crate::widgets::{
    button::Button,
    container::Container,
    flex::{Align, Column, Row},
    image::Image,
    text::Text,
    textbox::TextBox,
};

/// Element names the builder understands without an import.
pub const BUILTIN_WIDGETS: &[&str] = &["Column", "Row", "Container", "Text", "Button", "TextBox", "Image"];

fn color(rgba: [u8; 4]) -> Color {
    let [r, g, b, a] = rgba;
    Color::from_srgb_u8(r, g, b, a)
}

// ── DslBindings ───────────────────────────────────────────────────────────

/// Application resources available to markup while building.
pub struct DslBindings {
    /// Named fonts (`font: body` → `FontId`).
    pub fonts: HashMap<String, FontId>,
    pub default_font: Option<FontId>,
    /// Resolves `Image { source: ... }`. Without a store images stay empty.
    pub images: Option<Rc<RefCell<ImageStore>>>,
}

impl DslBindings {
    pub fn new() -> Self {
        Self { fonts: HashMap::new(), default_font: None, images: None }
    }

    /// Adds a named font; the first one added becomes the default.
    pub fn with_font(mut self, name: impl Into<String>, id: FontId) -> Self {
        self.fonts.insert(name.into(), id);
        self.default_font.get_or_insert(id);
        self
    }

    pub fn with_images(mut self, images: Rc<RefCell<ImageStore>>) -> Self {
        self.images = Some(images);
        self
    }

    fn font(&self, node: &Node) -> Option<FontId> {
        match node.prop_str("font") {
            Some(name) => self.fonts.get(name).copied().or(self.default_font),
            None => self.default_font,
        }
    }
}

impl Default for DslBindings {
    fn default() -> Self {
        Self::new()
    }
}

// ── DslLoader ─────────────────────────────────────────────────────────────

/// Parses and validates `.mkml` documents and builds widget trees from them.
pub struct DslLoader {
    registry: HashMap<String, Document>,
}

impl DslLoader {
    pub fn new() -> Self {
        Self { registry: HashMap::new() }
    }

    /// Parses `src` and checks every element against the built-ins and
    /// registered components.
    pub fn load(&self, src: &str) -> Result<Document, LoadError> {
        let doc = parse_str(src)?;
        self.validate(&doc)?;
        Ok(doc)
    }

    /// Makes `doc` available to other documents as `alias`.
    pub fn register(&mut self, alias: impl Into<String>, doc: Document) {
        self.registry.insert(alias.into(), doc);
    }

    pub fn load_and_register(&mut self, alias: impl Into<String>, src: &str) -> Result<(), LoadError> {
        let doc = self.load(src)?;
        self.register(alias, doc);
        Ok(())
    }

    pub fn is_registered(&self, alias: &str) -> bool {
        self.registry.contains_key(alias)
    }

    fn validate(&self, doc: &Document) -> Result<(), LoadError> {
        if let Some(missing) = doc.imports.iter().find(|i| !self.registry.contains_key(&i.alias)) {
            return Err(LoadError::UnresolvedImport {
                path: missing.path.clone(),
                alias: missing.alias.clone(),
            });
        }
        self.validate_node(&doc.root)
    }

    fn validate_node(&self, node: &Node) -> Result<(), LoadError> {
        if !BUILTIN_WIDGETS.contains(&node.kind.as_str()) && !self.registry.contains_key(&node.kind) {
            return Err(LoadError::UnknownWidget { kind: node.kind.clone(), line: node.line });
        }
        node.children.iter().try_for_each(|c| self.validate_node(c))
    }

    /// Builds the tree for `doc`, taking live widget values from `state`.
    pub fn build(&self, doc: &Document, bindings: &DslBindings, state: &UiState) -> Element {
        Builder { loader: self, bindings, state }.node(&doc.root)
    }
}

impl Default for DslLoader {
    fn default() -> Self {
        Self::new()
    }
}

// ── Builder ───────────────────────────────────────────────────────────────

struct Builder<'a> {
    loader: &'a DslLoader,
    bindings: &'a DslBindings,
    state: &'a UiState,
}

impl Builder<'_> {
    fn node(&self, node: &Node) -> Element {
        match node.kind.as_str() {
            "Column" => self.column(node),
            "Row" => self.row(node),
            "Container" => self.container(node),
            "Text" => self.text(node),
            "Button" => self.button(node),
            "TextBox" => self.textbox(node),
            "Image" => self.image(node),
            alias => match self.loader.registry.get(alias) {
                Some(component) => self.node(&component.root),
                None => {
                    log::warn!("mkml: unknown widget `{alias}` on line {}", node.line);
                    Container::new().into()
                }
            },
        }
    }

    fn column(&self, node: &Node) -> Element {
        let mut col = Column::new().cross_align(align(node));
        if let Some(v) = gap(node) {
            col = col.spacing(v);
        }
        if let Some(edges) = padding(node) {
            col = col.padding(edges);
        }
        for child in &node.children {
            col = col.child(self.node(child));
        }
        with_background(col.into(), node)
    }

    fn row(&self, node: &Node) -> Element {
        let mut row = Row::new().cross_align(align(node));
        if let Some(v) = gap(node) {
            row = row.spacing(v);
        }
        if let Some(edges) = padding(node) {
            row = row.padding(edges);
        }
        for child in &node.children {
            row = row.child(self.node(child));
        }
        with_background(row.into(), node)
    }

    fn container(&self, node: &Node) -> Element {
        let mut c = Container::new();
        if let Some(edges) = padding(node) {
            c = c.padding(edges);
        }
        if let Some(bg) = node.prop_color("bg") {
            c = c.background(color(bg));
        }
        if let Some(b) = border(node) {
            c = c.border(b);
        }
        let (w, h) = (node.prop_f32("min_width"), node.prop_f32("min_height"));
        if w.is_some() || h.is_some() {
            c = c.min_size(w.unwrap_or(0.0), h.unwrap_or(0.0));
        }
        if let Some(child) = node.children.first() {
            c = c.child(self.node(child));
        }
        c.into()
    }

    /// A `Text` with an id shows the string stored under that id once set.
    fn text(&self, node: &Node) -> Element {
        let Some(font) = self.bindings.font(node) else {
            return Container::new().into();
        };
        let content = node
            .id()
            .and_then(|id| self.state.text(id))
            .or(node.content.as_deref())
            .unwrap_or_default();
        let size = node.prop_f32("size").unwrap_or(14.0);
        let fg = node.prop_color("color").map(color).unwrap_or(Color::WHITE);
        Text::new(content, font, size, fg).into()
    }

    fn button(&self, node: &Node) -> Element {
        let inner: Element = match node.children.as_slice() {
            [only] => self.node(only),
            [] => match self.bindings.font(node) {
                Some(font) => {
                    let size = node.prop_f32("font_size").unwrap_or(14.0);
                    let fg = node.prop_color("text_color").map(color).unwrap_or(Color::WHITE);
                    Text::new(node.content.clone().unwrap_or_default(), font, size, fg).into()
                }
                None => Container::new().into(),
            },
            many => many.iter().fold(Column::new(), |col, c| col.child(self.node(c))).into(),
        };

        let mut btn = Button::new(inner);
        if let Some(id) = node.id() {
            btn = btn.id(id);
        }
        if let Some(c) = node.prop_color("bg") {
            btn = btn.background(color(c));
        }
        if let Some(c) = node.prop_color("hover_bg") {
            btn = btn.hover_background(color(c));
        }
        if let Some(c) = node.prop_color("press_bg") {
            btn = btn.press_background(color(c));
        }
        if let Some(edges) = padding(node) {
            btn = btn.padding(edges);
        }
        if let Some(b) = border(node) {
            btn = btn.border(b);
        }
        btn.into()
    }

    /// Boxes without an id are keyed by their line so edits survive rebuilds.
    fn textbox(&self, node: &Node) -> Element {
        let id = node.id().map(str::to_string).unwrap_or_else(|| format!("TextBox@{}", node.line));
        let text = self
            .state
            .text(&id)
            .or(node.content.as_deref())
            .unwrap_or_default()
            .to_string();

        let mut tb = TextBox::new(id.as_str()).text(text).focused(self.state.is_focused(&id));
        if let Some(font) = self.bindings.font(node) {
            tb = tb.font(font, node.prop_f32("size").unwrap_or(14.0));
        }
        if let Some(p) = node.prop_str("placeholder") {
            tb = tb.placeholder(p);
        }
        if let Some(w) = node.prop_f32("width") {
            tb = tb.min_width(w);
        }
        if let Some(c) = node.prop_color("color") {
            tb = tb.text_color(color(c));
        }
        if let Some(c) = node.prop_color("bg") {
            tb = tb.background(color(c));
        }
        tb.into()
    }

    fn image(&self, node: &Node) -> Element {
        let requested = Size::new(
            node.prop_f32("source_width").map_or(0, |v| v.max(0.0) as u32),
            node.prop_f32("source_height").map_or(0, |v| v.max(0.0) as u32),
        );
        let bitmap = match (node.prop_str("source"), &self.bindings.images) {
            (Some(src), Some(images)) => images.borrow_mut().resolve(src, requested),
            _ => None,
        };
        let mut img = Image::new(bitmap);
        if let Some(w) = node.prop_f32("width") {
            img = img.width(w);
        }
        if let Some(h) = node.prop_f32("height") {
            img = img.height(h);
        }
        img.into()
    }
}

// ── property helpers ──────────────────────────────────────────────────────

fn gap(node: &Node) -> Option<f32> {
    node.prop_f32("gap").or_else(|| node.prop_f32("spacing"))
}

fn align(node: &Node) -> Align {
    node.prop_str("align").and_then(Align::parse).unwrap_or(Align::Stretch)
}

/// `padding` for all sides, overridden per side by `padding_top` and friends.
fn padding(node: &Node) -> Option<Edges> {
    let all = node.prop_f32("padding");
    let sides = [
        node.prop_f32("padding_top"),
        node.prop_f32("padding_right"),
        node.prop_f32("padding_bottom"),
        node.prop_f32("padding_left"),
    ];
    if all.is_none() && sides.iter().all(Option::is_none) {
        return None;
    }
    let base = all.unwrap_or(0.0);
    let [top, right, bottom, left] = sides.map(|s| s.unwrap_or(base));
    Some(Edges { top, right, bottom, left })
}

fn border(node: &Node) -> Option<Border> {
    let width = node.prop_f32("border_width")?;
    let c = node
        .prop_color("border_color")
        .map(color)
        .unwrap_or_else(|| Color::from_straight(1.0, 1.0, 1.0, 0.3));
    Some(Border::new(width, c))
}

/// Flex containers have no fill of their own; `bg` wraps them in one.
fn with_background(elem: Element, node: &Node) -> Element {
    match node.prop_color("bg") {
        Some(bg) => Container::new().background(color(bg)).child(elem).into(),
        None => elem,
    }
}

#[cfg(test)]
mod tests {
    use tandem_engine::coords::{Rect, Vec2};
    use tandem_engine::input::{Key, Modifiers};
    use tandem_engine::text::FontSystem;

    use super::*;
    use crate::constraints::{Constraints, LayoutCtx};
    use crate::event::UiEvent;

    // ── load ──────────────────────────────────────────────────────────────

    #[test]
    fn load_accepts_builtins() {
        let doc = DslLoader::new()
            .load(r#"Column { Row { Button "2x" { id: b1 }  TextBox { id: t1 } }  Text "fps" { id: l1 } }"#)
            .unwrap();
        assert!(doc.root.find_by_id("t1").is_some());
    }

    #[test]
    fn load_rejects_unknown_widget_with_line() {
        let err = DslLoader::new().load("Column {\n  Slider { }\n}").unwrap_err();
        assert_eq!(err, LoadError::UnknownWidget { kind: "Slider".into(), line: 2 });
    }

    #[test]
    fn load_reports_parse_errors() {
        assert!(matches!(DslLoader::new().load("Column {"), Err(LoadError::Parse(_))));
    }

    #[test]
    fn imports_must_be_registered() {
        let src = "import \"panel.mkml\" as Panel\nColumn { Panel }";
        let mut loader = DslLoader::new();
        assert!(matches!(loader.load(src), Err(LoadError::UnresolvedImport { .. })));
        loader.load_and_register("Panel", "Text \"hi\"").unwrap();
        assert!(loader.load(src).is_ok());
    }

    // ── build ─────────────────────────────────────────────────────────────

    #[test]
    fn builds_measurable_tree() {
        let fonts = FontSystem::new();
        let loader = DslLoader::new();
        let doc = loader
            .load(r#"Column { gap: 4  align: start  Image { width: 40  height: 20 }  Image { width: 40  height: 10 } }"#)
            .unwrap();
        let root = loader.build(&doc, &DslBindings::new(), &UiState::new());
        let size = root.measure(Constraints::loose(Vec2::new(500.0, 500.0)), &LayoutCtx::new(&fonts));
        assert_eq!(size, Vec2::new(40.0, 34.0));
    }

    #[test]
    fn textbox_continues_from_stored_text_and_focus() {
        let fonts = FontSystem::new();
        let loader = DslLoader::new();
        let doc = loader.load(r#"TextBox "1.0" { id: t1 }"#).unwrap();
        let state = RefCell::new(UiState::new());
        state.borrow_mut().set_text("t1", "2.5");
        state.borrow_mut().set_focus(Some("t1"));

        let mut root = loader.build(&doc, &DslBindings::new(), &state.borrow());
        let key = UiEvent::KeyPress { key: Key::Backspace, modifiers: Modifiers::default() };
        let ctx = LayoutCtx::with_state(&fonts, &state);
        assert!(root.on_event(&key, Rect::new(0.0, 0.0, 100.0, 24.0), &ctx).is_consumed());
        assert_eq!(state.borrow().text("t1"), Some("2."));
    }

    // ── helpers ───────────────────────────────────────────────────────────

    #[test]
    fn padding_sides_override_all() {
        let doc = parse_str("Container { padding: 4  padding_left: 10 }").unwrap();
        let e = padding(&doc.root).unwrap();
        assert_eq!(e, Edges { top: 4.0, right: 4.0, bottom: 4.0, left: 10.0 });
        assert_eq!(padding(&parse_str("Container").unwrap().root), None);
    }

    #[test]
    fn align_defaults_to_stretch() {
        assert_eq!(align(&parse_str("Row { align: center }").unwrap().root), Align::Center);
        assert_eq!(align(&parse_str("Row { align: bogus }").unwrap().root), Align::Stretch);
    }
}
