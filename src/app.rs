// ============================================================================
// APP — egui host around the paint core
// ============================================================================

use std::sync::Arc;

use eframe::egui;
use egui::{
    Color32, ColorImage, Pos2, Rect, Sense, TextureHandle, TextureOptions, Vec2,
};
use rayon::prelude::*;

use crate::canvas::{Canvas, Connectivity, Selection, ToolSettings};
use crate::history::History;
use crate::raster::{self, PixelBuffer};
use crate::tools::{
    bucket::BucketTool, eraser::EraserTool, eyedropper::EyedropperTool, pan::PanTool,
    pencil::PencilTool, polygon::PolygonTool, select::MoveTool, select::SelectTool,
    shapes::{ShapeKind, ShapeTool}, spray::SprayTool, text::TextTool, Modifiers, PointerEvent,
    Tool, ToolCtx,
};
use crate::viewport::Viewport;
use crate::{clipboard, io, log_err, log_info, text};

const DEFAULT_CANVAS_W: u32 = 800;
const DEFAULT_CANVAS_H: u32 = 600;

/// Checkerboard shown under transparent pixels.
const CHECKER_LIGHT: u32 = 0xFFE8_E8E8;
const CHECKER_DARK: u32 = 0xFFCF_CFCF;
const CHECKER_TILE: i32 = 8;

/// Everything the tools operate on. Kept apart from the tool list so a
/// tool and the context it borrows never alias.
struct Workspace {
    canvas: Canvas,
    history: History,
    viewport: Viewport,
    settings: ToolSettings,
    selection: Option<Selection>,
    status: String,
    text_prompt: Option<(f32, f32)>,
}

impl Workspace {
    fn new(w: u32, h: u32) -> Self {
        let canvas = Canvas::new(w, h);
        let history = History::new(&canvas);
        Self {
            canvas,
            history,
            viewport: Viewport::default(),
            settings: ToolSettings::default(),
            selection: None,
            status: "Ready".to_string(),
            text_prompt: None,
        }
    }

    fn tool_ctx(&mut self) -> ToolCtx {
        ToolCtx {
            canvas: &mut self.canvas,
            history: &mut self.history,
            viewport: &mut self.viewport,
            settings: &mut self.settings,
            selection: &mut self.selection,
            status: &mut self.status,
            text_prompt: &mut self.text_prompt,
        }
    }

    /// Deselect without losing pixels (anchored selections are already in
    /// the base; a floating one is restored first).
    fn drop_selection(&mut self) {
        if let Some(mut sel) = self.selection.take() {
            sel.restore_to(&mut self.canvas);
        }
        self.canvas.clear_overlay();
    }
}

pub struct PixelpadApp {
    doc: Workspace,
    tools: Vec<Box<dyn Tool>>,
    active_tool: usize,
    pointer_down: bool,
    last_cursor: (f32, f32),
    text_input: String,
    texture: Option<TextureHandle>,
}

impl PixelpadApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let tools: Vec<Box<dyn Tool>> = vec![
            Box::new(PencilTool::default()),
            Box::new(EraserTool::default()),
            Box::new(ShapeTool::new(ShapeKind::Line)),
            Box::new(ShapeTool::new(ShapeKind::Rect)),
            Box::new(ShapeTool::new(ShapeKind::Ellipse)),
            Box::new(PolygonTool::default()),
            Box::new(SprayTool::default()),
            Box::new(BucketTool),
            Box::new(EyedropperTool),
            Box::new(TextTool),
            Box::new(SelectTool::default()),
            Box::new(MoveTool::default()),
            Box::new(PanTool::default()),
        ];
        let mut app = Self {
            doc: Workspace::new(DEFAULT_CANVAS_W, DEFAULT_CANVAS_H),
            tools,
            active_tool: 0,
            pointer_down: false,
            last_cursor: (DEFAULT_CANVAS_W as f32 / 2.0, DEFAULT_CANVAS_H as f32 / 2.0),
            text_input: String::new(),
            texture: None,
        };
        app.tools[0].on_select(&mut app.doc.tool_ctx());
        app
    }

    fn switch_tool(&mut self, idx: usize) {
        if idx == self.active_tool || idx >= self.tools.len() {
            return;
        }
        if self.pointer_down {
            self.tools[self.active_tool].on_cancel(&mut self.doc.tool_ctx());
            self.pointer_down = false;
        }
        self.tools[self.active_tool].on_deselect(&mut self.doc.tool_ctx());
        self.active_tool = idx;
        self.tools[idx].on_select(&mut self.doc.tool_ctx());
    }

    fn cancel_gesture(&mut self) {
        self.tools[self.active_tool].on_cancel(&mut self.doc.tool_ctx());
        self.pointer_down = false;
        if self.doc.text_prompt.take().is_some() {
            self.text_input.clear();
        }
    }

    // ---- menu operations ---------------------------------------------------

    fn new_canvas(&mut self) {
        self.cancel_gesture();
        self.doc.drop_selection();
        self.doc.canvas.clear_base_transparent();
        self.doc.history.clear(&self.doc.canvas);
        self.doc.viewport.reset();
        self.doc.status = "New canvas".to_string();
    }

    fn open_file(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &["png", "jpg", "jpeg", "bmp", "gif", "webp"])
            .pick_file()
        else {
            return;
        };
        match io::open_image(&path) {
            Ok(img) => {
                self.cancel_gesture();
                self.doc.drop_selection();
                self.doc.canvas = Canvas::new(img.width(), img.height());
                self.doc.canvas.base_mut().blit(&img, 0, 0);
                self.doc.history.clear(&self.doc.canvas);
                self.doc.viewport.reset();
                self.doc.status = format!("Opened {}", path.display());
            }
            Err(err) => {
                log_err!("open failed: {}", err);
                self.doc.status = err;
            }
        }
    }

    fn save_file_as(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG", &["png"])
            .add_filter("JPEG", &["jpg", "jpeg"])
            .set_file_name("untitled.png")
            .save_file()
        else {
            return;
        };
        let format = io::SaveFormat::from_path(&path);
        match io::save_image(&path, self.doc.canvas.base(), format) {
            Ok(()) => self.doc.status = format!("Saved {}", path.display()),
            Err(err) => {
                log_err!("save failed: {}", err);
                self.doc.status = err;
            }
        }
    }

    fn undo(&mut self) {
        self.cancel_gesture();
        self.doc.drop_selection();
        self.doc.history.undo(&mut self.doc.canvas);
        self.doc.status = "Undo".to_string();
    }

    fn redo(&mut self) {
        self.cancel_gesture();
        self.doc.drop_selection();
        self.doc.history.redo(&mut self.doc.canvas);
        self.doc.status = "Redo".to_string();
    }

    /// Selection rect re-read from the base at action time, so edits made
    /// after the marquee was drawn are included. Anchored rects are read at
    /// their on-canvas intersection so cut clears exactly what was copied.
    fn selection_pixels(&self) -> Option<(PixelBuffer, i32, i32)> {
        let sel = self.doc.selection.as_ref()?;
        if sel.floating {
            return Some((sel.image.clone(), sel.x.round() as i32, sel.y.round() as i32));
        }
        let (x, y, w, h) = sel.canvas_rect(&self.doc.canvas)?;
        let img = self.doc.canvas.base().sub_buffer(x, y, w, h);
        Some((img, x as i32, y as i32))
    }

    fn copy_selection(&mut self) {
        if let Some((img, _, _)) = self.selection_pixels() {
            clipboard::put_image(img);
            self.doc.drop_selection();
            self.doc.status = "Copied".to_string();
        } else {
            self.doc.status = "Nothing selected".to_string();
        }
    }

    fn cut_selection(&mut self) {
        let Some((img, x, y)) = self.selection_pixels() else {
            self.doc.status = "Nothing selected".to_string();
            return;
        };
        let (w, h) = (img.width(), img.height());
        clipboard::put_image(img);
        self.doc.canvas.base_mut().clear_rect(x, y, w, h);
        self.doc.selection = None;
        self.doc.canvas.clear_overlay();
        self.doc.history.push(&self.doc.canvas);
        self.doc.status = "Cut".to_string();
    }

    /// Paste at the last cursor position, pulled inside the canvas so the
    /// whole image lands on it (top-left clamped to canvas − image size).
    fn paste(&mut self) {
        let Some(img) = clipboard::get_image() else {
            self.doc.status = "Clipboard is empty".to_string();
            return;
        };
        let (x, y) = crate::canvas::paste_anchor(
            self.doc.canvas.width(),
            self.doc.canvas.height(),
            self.last_cursor,
            img.width(),
            img.height(),
        );
        self.doc.canvas.base_mut().draw_image(&img, x, y);
        self.doc.history.push(&self.doc.canvas);
        self.doc.status = format!("Pasted {}×{} at ({}, {})", img.width(), img.height(), x, y);
    }

    fn commit_text(&mut self) {
        let Some((x, y)) = self.doc.text_prompt.take() else {
            return;
        };
        let input = std::mem::take(&mut self.text_input);
        if input.is_empty() {
            return;
        }
        match text::load_system_font(&self.doc.settings.font) {
            Some(font) => {
                let color = text::effective_text_color(self.doc.settings.text_color);
                let size = self.doc.settings.font.size;
                if text::draw_text(self.doc.canvas.base_mut(), &font, &input, size, x, y, color) {
                    self.doc.history.push(&self.doc.canvas);
                    self.doc.status = format!("Placed \"{}\"", input);
                }
            }
            None => {
                self.doc.status = "No usable system font".to_string();
            }
        }
    }

    // ---- rendering ---------------------------------------------------------

    /// Composite checkerboard, base and overlay into one opaque frame, plus
    /// the floating ghost already baked into the overlay by the move tool.
    fn composite(&self) -> ColorImage {
        let w = self.doc.canvas.width() as usize;
        let h = self.doc.canvas.height() as usize;
        let base = self.doc.canvas.base().as_slice();
        let overlay = self.doc.canvas.overlay().as_slice();

        let mut pixels = vec![Color32::BLACK; w * h];
        pixels
            .par_chunks_mut(w)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, out) in row.iter_mut().enumerate() {
                    let check = if ((x as i32 / CHECKER_TILE) + (y as i32 / CHECKER_TILE)) % 2 == 0
                    {
                        CHECKER_LIGHT
                    } else {
                        CHECKER_DARK
                    };
                    let i = y * w + x;
                    let mut p = raster::source_over(check, base[i]);
                    if overlay[i] != 0 {
                        p = raster::source_over(p, overlay[i]);
                    }
                    *out = Color32::from_rgb(raster::red(p), raster::green(p), raster::blue(p));
                }
            });
        ColorImage { size: [w, h], pixels }
    }

    fn upload_texture(&mut self, ctx: &egui::Context) {
        let image = self.composite();
        let options = TextureOptions {
            magnification: egui::TextureFilter::Nearest,
            minification: egui::TextureFilter::Nearest,
            ..Default::default()
        };
        let data = egui::ImageData::Color(Arc::new(image));
        match &mut self.texture {
            Some(tex) => tex.set(data, options),
            None => self.texture = Some(ctx.load_texture("canvas", data, options)),
        }
    }

    fn canvas_panel(&mut self, ui: &mut egui::Ui, input: &FrameInput) {
        let avail = ui.available_size();
        // The canvas only ever grows with its panel; shrinking would drop
        // committed pixels.
        let want_w = (avail.x.floor() as u32).max(self.doc.canvas.width());
        let want_h = (avail.y.floor() as u32).max(self.doc.canvas.height());
        if want_w > self.doc.canvas.width() || want_h > self.doc.canvas.height() {
            self.doc.canvas.resize(want_w, want_h);
        }

        self.upload_texture(ui.ctx());
        let (response, painter) = ui.allocate_painter(avail, Sense::click_and_drag());
        let origin = response.rect.min;

        painter.rect_filled(response.rect, 0.0, Color32::from_gray(48));
        if let Some(tex) = &self.texture {
            let (tx, ty) = self.doc.viewport.translate();
            let zoom = self.doc.viewport.zoom() as f32;
            let rect = Rect::from_min_size(
                origin + Vec2::new(tx as f32, ty as f32),
                Vec2::new(
                    self.doc.canvas.width() as f32 * zoom,
                    self.doc.canvas.height() as f32 * zoom,
                ),
            );
            painter.image(
                tex.id(),
                rect,
                Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                Color32::WHITE,
            );
        }

        let pointer_pos = input.pointer_pos.filter(|_| {
            // Only react to the pointer while it is over (or dragging from)
            // the canvas panel.
            self.pointer_down || response.hovered()
        });
        let Some(pos) = pointer_pos else {
            return;
        };
        let scene = (f64::from(pos.x - origin.x), f64::from(pos.y - origin.y));
        let (cx, cy) = self.doc.viewport.scene_to_canvas(scene.0, scene.1);
        self.last_cursor = (cx as f32, cy as f32);

        if response.hovered() && input.scroll_y != 0.0 {
            if self.doc.viewport.wheel_zoom(
                scene.0,
                scene.1,
                f64::from(input.scroll_y),
                input.modifiers.shift,
                input.modifiers.ctrl_or_meta,
            ) {
                self.doc.status = self.doc.viewport.status_line();
            }
        }

        let ev = PointerEvent {
            x: cx as f32,
            y: cy as f32,
            scene_x: scene.0,
            scene_y: scene.1,
            modifiers: input.modifiers,
        };
        if input.primary_pressed && response.hovered() && self.doc.text_prompt.is_none() {
            self.pointer_down = true;
            self.tools[self.active_tool].on_press(&mut self.doc.tool_ctx(), &ev);
        } else if self.pointer_down && input.primary_down {
            self.tools[self.active_tool].on_drag(&mut self.doc.tool_ctx(), &ev);
        } else if self.pointer_down && input.primary_released {
            self.pointer_down = false;
            self.tools[self.active_tool].on_release(&mut self.doc.tool_ctx(), &ev);
        }
    }

    fn text_editor_window(&mut self, ctx: &egui::Context) {
        let Some((x, y)) = self.doc.text_prompt else {
            return;
        };
        let mut place = false;
        let mut discard = false;
        egui::Window::new("Text")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!("At ({:.0}, {:.0})", x, y));
                let edit = ui.text_edit_singleline(&mut self.text_input);
                edit.request_focus();
                ui.horizontal(|ui| {
                    if ui.button("Place").clicked() {
                        place = true;
                    }
                    if ui.button("Cancel").clicked() {
                        discard = true;
                    }
                });
            });
        if place {
            self.commit_text();
        } else if discard {
            self.doc.text_prompt = None;
            self.text_input.clear();
        }
    }

    fn menu_bar(&mut self, ui: &mut egui::Ui) {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("New").clicked() {
                    self.new_canvas();
                    ui.close_menu();
                }
                if ui.button("Open…").clicked() {
                    self.open_file();
                    ui.close_menu();
                }
                if ui.button("Save As…").clicked() {
                    self.save_file_as();
                    ui.close_menu();
                }
            });
            ui.menu_button("Edit", |ui| {
                let can_undo = self.doc.history.can_undo();
                let can_redo = self.doc.history.can_redo();
                if ui.add_enabled(can_undo, egui::Button::new("Undo")).clicked() {
                    self.undo();
                    ui.close_menu();
                }
                if ui.add_enabled(can_redo, egui::Button::new("Redo")).clicked() {
                    self.redo();
                    ui.close_menu();
                }
                ui.separator();
                let has_sel = self.doc.selection.is_some();
                if ui.add_enabled(has_sel, egui::Button::new("Copy")).clicked() {
                    self.copy_selection();
                    ui.close_menu();
                }
                if ui.add_enabled(has_sel, egui::Button::new("Cut")).clicked() {
                    self.cut_selection();
                    ui.close_menu();
                }
                if ui
                    .add_enabled(clipboard::has_image(), egui::Button::new("Paste"))
                    .clicked()
                {
                    self.paste();
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("Commit Polygon").clicked() {
                    self.tools[self.active_tool].on_confirm(&mut self.doc.tool_ctx());
                    ui.close_menu();
                }
                if ui.add_enabled(has_sel, egui::Button::new("Deselect")).clicked() {
                    self.doc.drop_selection();
                    ui.close_menu();
                }
            });
            ui.menu_button("View", |ui| {
                if ui.button("Reset Zoom & Pan").clicked() {
                    self.doc.viewport.reset();
                    self.doc.status = self.doc.viewport.status_line();
                    ui.close_menu();
                }
            });
        });
    }

    fn tool_palette(&mut self, ui: &mut egui::Ui) {
        ui.heading("Tools");
        ui.separator();
        let mut clicked = None;
        for (i, tool) in self.tools.iter().enumerate() {
            if ui
                .selectable_label(i == self.active_tool, tool.name())
                .clicked()
            {
                clicked = Some(i);
            }
        }
        if let Some(i) = clicked {
            self.switch_tool(i);
        }
    }

    fn properties_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Properties");
        ui.separator();

        let s = &mut self.doc.settings;
        color_picker(ui, "Stroke", &mut s.stroke);
        color_picker(ui, "Fill", &mut s.fill);
        ui.add(egui::Slider::new(&mut s.brush, 1.0..=50.0).text("Brush"));

        ui.separator();
        ui.label("Bucket fill");
        ui.add(egui::Slider::new(&mut s.fill_tolerance, 0.0..=1.0).text("Tolerance"));
        egui::ComboBox::from_label("Connectivity")
            .selected_text(s.fill_connectivity.label())
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut s.fill_connectivity, Connectivity::FourWay, "4-way");
                ui.selectable_value(&mut s.fill_connectivity, Connectivity::EightWay, "8-way");
            });
        let mut expand = s.fill_expand as u32;
        ui.add(egui::Slider::new(&mut expand, 0..=3).text("Expand"));
        s.fill_expand = expand as u8;

        ui.separator();
        ui.label("Text");
        color_picker(ui, "Color", &mut s.text_color);
        ui.add(egui::Slider::new(&mut s.font.size, 8.0..=128.0).text("Size"));
        ui.horizontal(|ui| {
            ui.checkbox(&mut s.font.bold, "Bold");
            ui.checkbox(&mut s.font.italic, "Italic");
        });
        ui.text_edit_singleline(&mut s.font.family);
    }

    fn handle_shortcuts(&mut self, input: &FrameInput) {
        if input.escape {
            self.cancel_gesture();
        }
        if input.enter {
            if self.doc.text_prompt.is_some() {
                self.commit_text();
            } else {
                self.tools[self.active_tool].on_confirm(&mut self.doc.tool_ctx());
            }
        }
        if input.modifiers.ctrl_or_meta {
            if input.undo_key {
                if input.modifiers.shift {
                    self.redo();
                } else {
                    self.undo();
                }
            }
            if input.redo_key {
                self.redo();
            }
            if input.copy_key {
                self.copy_selection();
            }
            if input.cut_key {
                self.cut_selection();
            }
            if input.paste_key {
                self.paste();
            }
        }
    }
}

/// One frame's worth of raw input, read once at the top of `update`.
struct FrameInput {
    pointer_pos: Option<Pos2>,
    primary_pressed: bool,
    primary_down: bool,
    primary_released: bool,
    scroll_y: f32,
    modifiers: Modifiers,
    escape: bool,
    enter: bool,
    undo_key: bool,
    redo_key: bool,
    copy_key: bool,
    cut_key: bool,
    paste_key: bool,
}

impl FrameInput {
    fn read(ctx: &egui::Context) -> Self {
        ctx.input(|i| FrameInput {
            pointer_pos: i.pointer.interact_pos(),
            primary_pressed: i.pointer.primary_pressed(),
            primary_down: i.pointer.primary_down(),
            primary_released: i.pointer.primary_released(),
            scroll_y: i.scroll_delta.y,
            modifiers: Modifiers {
                shift: i.modifiers.shift,
                ctrl_or_meta: i.modifiers.command,
            },
            escape: i.key_pressed(egui::Key::Escape),
            enter: i.key_pressed(egui::Key::Enter),
            undo_key: i.key_pressed(egui::Key::Z),
            redo_key: i.key_pressed(egui::Key::Y),
            copy_key: i.key_pressed(egui::Key::C),
            cut_key: i.key_pressed(egui::Key::X),
            paste_key: i.key_pressed(egui::Key::V),
        })
    }
}

fn color_picker(ui: &mut egui::Ui, label: &str, argb: &mut u32) {
    ui.horizontal(|ui| {
        let mut color = Color32::from_rgba_unmultiplied(
            raster::red(*argb),
            raster::green(*argb),
            raster::blue(*argb),
            raster::alpha(*argb),
        );
        if ui.color_edit_button_srgba(&mut color).changed() {
            *argb = raster::pack_argb(color.a(), color.r(), color.g(), color.b());
        }
        ui.label(label);
    });
}

impl eframe::App for PixelpadApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let input = FrameInput::read(ctx);
        // Text editing owns the keyboard while the prompt is open.
        if self.doc.text_prompt.is_none() || input.escape || input.enter {
            self.handle_shortcuts(&input);
        }

        egui::TopBottomPanel::top("menu").show(ctx, |ui| self.menu_bar(ui));
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(&self.doc.status);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(self.doc.viewport.status_line());
                });
            });
        });
        egui::SidePanel::left("tools")
            .resizable(false)
            .default_width(110.0)
            .show(ctx, |ui| self.tool_palette(ui));
        egui::SidePanel::right("properties")
            .default_width(180.0)
            .show(ctx, |ui| self.properties_panel(ui));
        egui::CentralPanel::default().show(ctx, |ui| self.canvas_panel(ui, &input));

        self.text_editor_window(ctx);
    }
}

pub fn run() -> Result<(), eframe::Error> {
    crate::logger::init();
    log_info!("starting Pixelpad");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title("Pixelpad"),
        ..Default::default()
    };
    eframe::run_native(
        "Pixelpad",
        options,
        Box::new(|cc| Box::new(PixelpadApp::new(cc))),
    )
}
