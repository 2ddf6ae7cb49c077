use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use winit::dpi::LogicalSize;

use tandem_engine::coords::Vec2;
use tandem_engine::core::{App as EngineApp, AppControl, FrameCtx, SetupCtx};
use tandem_engine::device::{Gpu, GpuInit};
use tandem_engine::paint::Color;
use tandem_engine::render::shapes::image::ImageRenderer;
use tandem_engine::render::shapes::rect::RectRenderer;
use tandem_engine::render::shapes::text::TextRenderer;
use tandem_engine::render::{RenderCtx, RenderTarget};
use tandem_engine::window::{Runtime, RuntimeConfig};
use tandem_mkml::{parse_str, Document};

use crate::dsl::{DslBindings, DslLoader};
use crate::image::{ImageProvider, ImageStore};
use crate::scene::{UiInput, UiScene};
use crate::signal::{SignalCtx, SignalRouter};
use crate::url::UrlInterceptor;

type ContextHook = Box<dyn FnMut(&Gpu<'_>)>;
type ResizeHook = Box<dyn FnMut(u32, u32)>;
type BeforeRenderHook = Box<dyn FnMut(&mut RenderHook<'_, '_, '_>)>;
type AfterRenderHook = Box<dyn FnMut(&mut AfterRender)>;
type ExitHook = Box<dyn FnMut()>;

// ── hook contexts ─────────────────────────────────────────────────────────

/// Passed to the before-render hook, ahead of the UI on the same frame.
pub struct RenderHook<'a, 'c, 't> {
    pub rctx: &'a RenderCtx<'c>,
    pub target: &'a mut RenderTarget<'t>,
    /// Milliseconds since the previous frame.
    pub dt_ms: f32,
    /// Live UI values, e.g. for updating a status label.
    pub ui: SignalCtx<'a>,
}

/// Passed to the after-render hook once the frame is submitted.
#[derive(Debug, Default)]
pub struct AfterRender {
    redraw: bool,
}

impl AfterRender {
    /// Schedules another frame, keeping a continuous render loop alive.
    pub fn request_redraw(&mut self) {
        self.redraw = true;
    }

    pub fn redraw_requested(&self) -> bool {
        self.redraw
    }
}

// ── Application ───────────────────────────────────────────────────────────

/// Builder for a markup-driven window.
///
/// ```rust,ignore
/// Application::new()
///     .title("cube")
///     .font("body", font_bytes)
///     .image_provider("nya_provider", AssetImageProvider::new(resources))
///     .on_signal("b1", "clicked", "double", |_, _| speed *= 2.0)
///     .on_before_render(|hook| driver.draw(hook))
///     .clear_before_rendering(false)
///     .run_file("ui/main.mkml")?;
/// ```
pub struct Application {
    title: String,
    width: f64,
    height: f64,
    fonts: Vec<(String, Vec<u8>)>,
    components: Vec<(String, String)>,
    images: ImageStore,
    router: SignalRouter,
    clear_before_rendering: bool,
    background: Color,
    on_context_created: Option<ContextHook>,
    on_resize: Option<ResizeHook>,
    on_before_render: Option<BeforeRenderHook>,
    on_after_render: Option<AfterRenderHook>,
    on_exit: Option<ExitHook>,
}

impl Application {
    pub fn new() -> Self {
        Self {
            title: "tandem".to_string(),
            width: 1024.0,
            height: 768.0,
            fonts: Vec::new(),
            components: Vec::new(),
            images: ImageStore::new(UrlInterceptor::new()),
            router: SignalRouter::new(),
            clear_before_rendering: true,
            background: Color::from_straight(0.07, 0.07, 0.09, 1.0),
            on_context_created: None,
            on_resize: None,
            on_before_render: None,
            on_after_render: None,
            on_exit: None,
        }
    }

    pub fn title(mut self, t: impl Into<String>) -> Self {
        self.title = t.into();
        self
    }

    /// Initial window size in logical pixels.
    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Registers a font for `font: name` in markup. The first font that loads
    /// is the default.
    pub fn font(mut self, name: impl Into<String>, data: Vec<u8>) -> Self {
        self.fonts.push((name.into(), data));
        self
    }

    /// Registers markup `src` under `alias` for `import ... as alias`.
    pub fn component(mut self, alias: impl Into<String>, src: impl Into<String>) -> Self {
        self.components.push((alias.into(), src.into()));
        self
    }

    pub fn image_provider(mut self, name: impl Into<String>, provider: impl ImageProvider + 'static) -> Self {
        self.images.add_provider(name, Box::new(provider));
        self
    }

    /// Replaces the default interceptor. [`run_file`](Self::run_file) still
    /// sets its base URL to the markup directory.
    pub fn url_interceptor(mut self, interceptor: UrlInterceptor) -> Self {
        *self.images.interceptor_mut() = interceptor;
        self
    }

    /// Routes `signal` from the widget with id `source` to `callback`.
    pub fn on_signal<F>(mut self, source: &str, signal: &str, tag: &str, callback: F) -> Self
    where
        F: FnMut(&str, &mut SignalCtx<'_>) + 'static,
    {
        self.router.register(source, signal, tag, callback);
        self
    }

    /// Runs once when the GPU context exists, before the first frame.
    pub fn on_context_created(mut self, f: impl FnMut(&Gpu<'_>) + 'static) -> Self {
        self.on_context_created = Some(Box::new(f));
        self
    }

    /// Drawable size in physical pixels; never zero.
    pub fn on_resize(mut self, f: impl FnMut(u32, u32) + 'static) -> Self {
        self.on_resize = Some(Box::new(f));
        self
    }

    /// Runs every frame before the UI is drawn into the same target.
    pub fn on_before_render(mut self, f: impl FnMut(&mut RenderHook<'_, '_, '_>) + 'static) -> Self {
        self.on_before_render = Some(Box::new(f));
        self
    }

    pub fn on_after_render(mut self, f: impl FnMut(&mut AfterRender) + 'static) -> Self {
        self.on_after_render = Some(Box::new(f));
        self
    }

    pub fn on_exit(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_exit = Some(Box::new(f));
        self
    }

    /// Whether the frame is cleared to the background before the
    /// before-render hook. Turn off when the hook clears by itself.
    pub fn clear_before_rendering(mut self, v: bool) -> Self {
        self.clear_before_rendering = v;
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    // ── entry points ──────────────────────────────────────────────────────

    /// Opens the window with `src` as the root document and blocks until it
    /// closes. Markup errors are returned before any window is created.
    pub fn run(self, src: &str) -> Result<()> {
        let loader = self.component_loader()?;
        let doc = loader.load(src).context("failed to load main markup")?;
        self.launch(loader, doc)
    }

    /// Like [`run`](Self::run), reading the root document from `path`.
    ///
    /// Imports are resolved against the document's directory, which also
    /// becomes the base URL for image sources.
    pub fn run_file(mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let abs = fs::canonicalize(path).with_context(|| format!("markup file {} not found", path.display()))?;
        let dir = abs.parent().map(Path::to_path_buf).unwrap_or_default();
        self.images.interceptor_mut().set_base_url(&dir.to_string_lossy());

        let mut loader = self.component_loader()?;
        let doc = load_file(&mut loader, &abs, &mut HashSet::new())?;
        self.launch(loader, doc)
    }

    fn component_loader(&self) -> Result<DslLoader> {
        let mut loader = DslLoader::new();
        for (alias, src) in &self.components {
            loader
                .load_and_register(alias.as_str(), src)
                .with_context(|| format!("failed to load component {alias}"))?;
        }
        Ok(loader)
    }

    fn launch(self, loader: DslLoader, doc: Document) -> Result<()> {
        let config = RuntimeConfig {
            title: self.title.clone(),
            initial_size: LogicalSize::new(self.width, self.height),
        };
        let state = UiAppState::new(self, loader, doc);
        Runtime::run(config, GpuInit::default(), state)
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

/// Loads `path` after loading its imports depth-first, relative to its directory.
fn load_file(loader: &mut DslLoader, path: &Path, visiting: &mut HashSet<PathBuf>) -> Result<Document> {
    if !visiting.insert(path.to_path_buf()) {
        bail!("import cycle through {}", path.display());
    }
    let src = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let parsed = parse_str(&src).with_context(|| format!("in {}", path.display()))?;
    let dir = path.parent().unwrap_or(Path::new("."));

    for import in &parsed.imports {
        if loader.is_registered(&import.alias) {
            continue;
        }
        let component = load_file(loader, &dir.join(&import.path), visiting)?;
        loader.register(import.alias.as_str(), component);
    }

    visiting.remove(path);
    loader.load(&src).with_context(|| format!("in {}", path.display()))
}

// ── UiAppState ────────────────────────────────────────────────────────────

/// Implements the engine [`EngineApp`] for an [`Application`].
struct UiAppState {
    scene: UiScene,
    rect_renderer: RectRenderer,
    image_renderer: ImageRenderer,
    text_renderer: TextRenderer,

    loader: DslLoader,
    doc: Document,
    bindings: DslBindings,
    router: SignalRouter,

    clear_before_rendering: bool,
    background: Color,
    on_context_created: Option<ContextHook>,
    on_resize: Option<ResizeHook>,
    on_before_render: Option<BeforeRenderHook>,
    on_after_render: Option<AfterRenderHook>,
    on_exit: Option<ExitHook>,
}

impl UiAppState {
    fn new(app: Application, loader: DslLoader, doc: Document) -> Self {
        let mut scene = UiScene::new();
        let mut bindings = DslBindings::new().with_images(Rc::new(RefCell::new(app.images)));
        for (name, bytes) in &app.fonts {
            match scene.load_font(bytes) {
                Ok(id) => bindings = bindings.with_font(name.as_str(), id),
                Err(e) => log::warn!("failed to load font {name:?}: {e}"),
            }
        }

        Self {
            scene,
            rect_renderer: RectRenderer::new(),
            image_renderer: ImageRenderer::new(),
            text_renderer: TextRenderer::new(),
            loader,
            doc,
            bindings,
            router: app.router,
            clear_before_rendering: app.clear_before_rendering,
            background: app.background,
            on_context_created: app.on_context_created,
            on_resize: app.on_resize,
            on_before_render: app.on_before_render,
            on_after_render: app.on_after_render,
            on_exit: app.on_exit,
        }
    }

    /// Delivers signals raised while routing this frame's input.
    fn dispatch_signals(&mut self) {
        let state = self.scene.state.get_mut();
        for e in state.take_emitted() {
            self.router.emit(&e.source, &e.signal, &mut SignalCtx::new(state));
        }
    }
}

impl EngineApp for UiAppState {
    fn on_context_created(&mut self, ctx: &mut SetupCtx<'_, '_>) -> AppControl {
        log::info!("context created: {:?}", ctx.gpu.surface_format());
        if let Some(hook) = self.on_context_created.as_mut() {
            hook(ctx.gpu);
        }
        AppControl::Continue
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        if let Some(hook) = self.on_resize.as_mut() {
            hook(width, height);
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let (w, h) = ctx.window.logical_size();
        let input = UiInput::from_engine(ctx.input, ctx.input_frame);

        // ── build + layout + input ────────────────────────────────────────
        let root = self.loader.build(&self.doc, &self.bindings, &self.scene.state());
        let _ = self.scene.frame(root, Vec2::new(w, h), &input);
        self.dispatch_signals();

        // ── render ────────────────────────────────────────────────────────
        let dt_ms = ctx.time.dt_ms();
        let clear = self.clear_before_rendering.then_some(self.background);
        let UiScene { font_system, draw_list, state } = &mut self.scene;
        let rect_r = &mut self.rect_renderer;
        let image_r = &mut self.image_renderer;
        let text_r = &mut self.text_renderer;
        let before = &mut self.on_before_render;

        let control = ctx.render(clear, |rctx, target| {
            if let Some(hook) = before.as_mut() {
                let mut h = RenderHook { rctx, target: &mut *target, dt_ms, ui: SignalCtx::new(state.get_mut()) };
                hook(&mut h);
            }
            rect_r.render(rctx, target, draw_list);
            image_r.render(rctx, target, draw_list);
            text_r.render(rctx, target, draw_list, font_system);
        });

        let mut after = AfterRender::default();
        if let Some(hook) = self.on_after_render.as_mut() {
            hook(&mut after);
        }
        if after.redraw_requested() || self.scene.state.get_mut().take_dirty() {
            ctx.request_redraw();
        }
        control
    }

    fn on_exit(&mut self) {
        if let Some(hook) = self.on_exit.as_mut() {
            hook();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tandem-ui-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    // ── load_file ─────────────────────────────────────────────────────────

    #[test]
    fn loads_imports_relative_to_document() {
        let dir = scratch_dir("imports");
        fs::create_dir_all(dir.join("parts")).unwrap();
        fs::write(dir.join("parts/panel.mkml"), r#"Row { Button "2x" { id: b1 } }"#).unwrap();
        fs::write(dir.join("main.mkml"), "import \"parts/panel.mkml\" as Panel\nColumn { Panel }").unwrap();

        let mut loader = DslLoader::new();
        let doc = load_file(&mut loader, &dir.join("main.mkml"), &mut HashSet::new()).unwrap();
        assert_eq!(doc.root.kind, "Column");
        assert!(loader.is_registered("Panel"));
    }

    #[test]
    fn import_cycle_is_an_error() {
        let dir = scratch_dir("cycle");
        fs::write(dir.join("a.mkml"), "import \"b.mkml\" as B\nColumn { B }").unwrap();
        fs::write(dir.join("b.mkml"), "import \"a.mkml\" as A\nColumn { A }").unwrap();

        let err = load_file(&mut DslLoader::new(), &dir.join("a.mkml"), &mut HashSet::new()).unwrap_err();
        assert!(format!("{err:#}").contains("import cycle"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = scratch_dir("missing");
        assert!(load_file(&mut DslLoader::new(), &dir.join("nope.mkml"), &mut HashSet::new()).is_err());
    }

    // ── Application ───────────────────────────────────────────────────────

    #[test]
    fn bad_markup_fails_before_window() {
        let err = Application::new().run("Column { Slider }").unwrap_err();
        assert!(format!("{err:#}").contains("unknown widget `Slider`"));
    }

    #[test]
    fn bad_component_fails_before_window() {
        let err = Application::new().component("Panel", "Row {").run("Column { Panel }").unwrap_err();
        assert!(format!("{err:#}").contains("component Panel"));
    }

    #[test]
    fn after_render_flag() {
        let mut a = AfterRender::default();
        assert!(!a.redraw_requested());
        a.request_redraw();
        assert!(a.redraw_requested());
    }
}
