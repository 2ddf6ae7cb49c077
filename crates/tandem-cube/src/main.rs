//! Spinning cube under a markup UI: two speed buttons, a speed field and an
//! FPS label, sharing one window and one frame.

mod cube;
mod frame_driver;

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Result;
use tandem_engine::logging::{init_logging, LoggingConfig};
use tandem_engine::resources::{FileResourceProvider, ResourceProvider};
use tandem_ui::image::AssetImageProvider;
use tandem_ui::url::DEFAULT_PROVIDER;
use tandem_ui::widgets::button::CLICKED;
use tandem_ui::widgets::textbox::ACCEPTED;
use tandem_ui::Application;

use frame_driver::FrameDriver;

const UI_DIR: &str = "ui";

fn main() {
    init_logging(LoggingConfig::default());

    if let Err(e) = run() {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let ui_dir = ui_dir();
    let resources: Rc<dyn ResourceProvider> = Rc::new(FileResourceProvider::new(&ui_dir));
    let driver = Rc::new(RefCell::new(FrameDriver::new()));

    Application::new()
        .title("tandem cube")
        .size(1024.0, 768.0)
        .font("body", load_font())
        .image_provider(DEFAULT_PROVIDER, AssetImageProvider::new(resources))
        // ── speed controls ────────────────────────────────────────────────
        .on_signal("b1", CLICKED, "b1", {
            let d = Rc::clone(&driver);
            move |_, _| {
                d.borrow_mut().double_speed();
                log::info!("speed = {}", d.borrow().speed());
            }
        })
        .on_signal("b2", CLICKED, "b2", {
            let d = Rc::clone(&driver);
            move |_, _| {
                d.borrow_mut().halve_speed();
                log::info!("speed = {}", d.borrow().speed());
            }
        })
        .on_signal("t1", ACCEPTED, "t1", {
            let d = Rc::clone(&driver);
            move |_, ui| {
                let text = ui.text("t1").unwrap_or_default();
                if d.borrow_mut().set_speed_from_text(text) {
                    log::info!("speed = {}", d.borrow().speed());
                }
            }
        })
        // ── frame hooks ───────────────────────────────────────────────────
        .on_context_created({
            let d = Rc::clone(&driver);
            move |gpu| d.borrow_mut().on_context_created(gpu)
        })
        .on_resize({
            let d = Rc::clone(&driver);
            move |w, h| d.borrow_mut().on_resize(w, h)
        })
        .on_before_render({
            let d = Rc::clone(&driver);
            move |hook| d.borrow_mut().on_before_render(hook)
        })
        .on_after_render({
            let d = Rc::clone(&driver);
            move |after| d.borrow().on_after_render(after)
        })
        .on_exit(move || {
            let mut d = driver.borrow_mut();
            d.release();
            log::debug!("frame driver {:?} at {:.1} degrees", d.state(), d.angle());
        })
        .clear_before_rendering(false)
        .run_file(ui_dir.join("main.mkml"))
}

/// `ui/` under the working directory, else the one shipped with the crate.
fn ui_dir() -> PathBuf {
    let local = PathBuf::from(UI_DIR);
    if local.join("main.mkml").is_file() {
        local
    } else {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(UI_DIR)
    }
}

fn load_font() -> Vec<u8> {
    [
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/noto/NotoSans-Regular.ttf",
        "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ]
    .iter()
    .find_map(|p| std::fs::read(p).ok())
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use tandem_ui::dsl::DslLoader;

    use crate::frame_driver::STATUS_LABEL;

    #[test]
    fn shipped_markup_has_the_control_ids() {
        let doc = DslLoader::new().load(include_str!("../ui/main.mkml")).unwrap();
        for id in ["b1", "b2", "t1", STATUS_LABEL] {
            assert!(doc.root.find_by_id(id).is_some(), "missing {id}");
        }
    }
}
