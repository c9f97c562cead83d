/// Terminal-backed render device
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal,
};
use log::{debug, warn};
use meshview_core::{
    DeviceError, Mesh, MeshId, RenderDevice, RenderState, Rgb, SceneError, TransformTriple,
};
use std::io::{self, stdout, Stdout, Write};
use std::time::Instant;

use crate::renderer::AsciiRenderer;

/// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: f32 = 0.5;

/// Raw mode, alternate screen and mouse capture; undone on drop.
struct TerminalSession;

impl TerminalSession {
    fn enter(out: &mut Stdout, title: &str) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let session = Self;
        execute!(
            out,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            terminal::SetTitle(title)
        )?;
        Ok(session)
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        );
        if let Err(e) = terminal::disable_raw_mode() {
            warn!("failed to restore terminal mode: {}", e);
        }
        debug!("terminal session closed");
    }
}

/// Frames-per-second counter, refreshed once a second.
struct FpsCounter {
    last: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            last: Instant::now(),
            frames: 0,
            fps: 0.0,
        }
    }

    fn tick(&mut self) -> f32 {
        self.frames += 1;
        let now = Instant::now();
        if (now - self.last).as_secs() >= 1 {
            self.fps = self.frames as f32 / (now - self.last).as_secs_f32();
            self.frames = 0;
            self.last = now;
        }
        self.fps
    }
}

/// Render device drawing into the terminal through [`AsciiRenderer`].
///
/// The terminal is left untouched until [`RenderDevice::show`]; a device that
/// is dropped before then never enters raw mode.
pub struct TerminalDevice {
    renderer: AsciiRenderer,
    meshes: Vec<Option<Mesh>>,
    transforms: Option<TransformTriple>,
    requested: (u16, u16),
    title: String,
    caption: String,
    in_scene: bool,
    fps: FpsCounter,
    out: Stdout,
    // Dropped last, after the renderer and geometry.
    session: Option<TerminalSession>,
}

/// Clamp a requested viewport to the terminal, keeping one row for the status line.
pub fn fit_viewport(requested: (u16, u16), terminal: (u16, u16)) -> (usize, usize) {
    let cols = requested.0.min(terminal.0);
    let rows = requested.1.min(terminal.1.saturating_sub(1));
    (cols as usize, rows as usize)
}

impl TerminalDevice {
    /// Bind to the controlling terminal; fails if there is none.
    pub fn create(viewport: (u16, u16)) -> Result<Self, DeviceError> {
        let size = terminal::size()?;
        let (cols, rows) = fit_viewport(viewport, size);
        debug!(
            "terminal {}x{}, viewport {}x{} (requested {}x{})",
            size.0, size.1, cols, rows, viewport.0, viewport.1
        );
        Ok(Self {
            renderer: AsciiRenderer::new(cols, rows),
            meshes: Vec::new(),
            transforms: None,
            requested: viewport,
            title: String::new(),
            caption: String::new(),
            in_scene: false,
            fps: FpsCounter::new(),
            out: stdout(),
            session: None,
        })
    }

    fn draw_status(&mut self, fps: f32) -> io::Result<()> {
        let line = format!(
            "{} | FPS: {:.1} | {} | Click/Space=Next 0=All 1-9=Select Esc=Quit",
            self.title, fps, self.caption
        );
        let width = self.renderer.width().max(1);
        let line: String = line.chars().take(width).collect();
        queue!(
            self.out,
            cursor::MoveTo(0, self.renderer.height() as u16),
            SetBackgroundColor(Color::Reset),
            SetForegroundColor(Color::Yellow),
            Print(line),
            terminal::Clear(terminal::ClearType::UntilNewLine),
            ResetColor
        )
    }
}

impl RenderDevice for TerminalDevice {
    fn upload(&mut self, mesh: Mesh) -> MeshId {
        self.meshes.push(Some(mesh));
        MeshId::new(self.meshes.len() - 1)
    }

    fn release(&mut self, id: MeshId) {
        match self.meshes.get_mut(id.index()).and_then(Option::take) {
            Some(mesh) => debug!("released {}", mesh.name),
            None => warn!("release of unknown or already released mesh {:?}", id),
        }
    }

    fn set_render_state(&mut self, state: RenderState) {
        self.renderer.set_render_state(state);
    }

    fn show(&mut self, title: &str) -> Result<(), DeviceError> {
        if self.session.is_none() {
            self.session = Some(TerminalSession::enter(&mut self.out, title)?);
            execute!(self.out, terminal::Clear(terminal::ClearType::All))?;
        }
        self.title = title.to_string();
        Ok(())
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        let (width, height) = fit_viewport(self.requested, (cols, rows));
        debug!("resize to {}x{} cells", width, height);
        self.renderer.resize(width, height);
        if self.session.is_some() {
            if let Err(e) = execute!(self.out, terminal::Clear(terminal::ClearType::All)) {
                debug!("failed to clear after resize: {}", e);
            }
        }
    }

    fn aspect(&self) -> f32 {
        let (w, h) = (self.renderer.width(), self.renderer.height());
        if w == 0 || h == 0 {
            return 1.0;
        }
        w as f32 * CELL_ASPECT / h as f32
    }

    fn clear(&mut self, color: Rgb) {
        self.renderer.clear(color);
    }

    fn begin_scene(&mut self) -> Result<(), SceneError> {
        if self.session.is_none() || self.renderer.width() == 0 || self.renderer.height() == 0 {
            return Err(SceneError::SurfaceUnavailable);
        }
        self.in_scene = true;
        Ok(())
    }

    fn set_transforms(&mut self, transforms: &TransformTriple) {
        self.transforms = Some(*transforms);
    }

    fn draw_subset(&mut self, id: MeshId, subset: usize) {
        if !self.in_scene {
            return;
        }
        let (Some(Some(mesh)), Some(transforms)) =
            (self.meshes.get(id.index()), self.transforms.as_ref())
        else {
            return;
        };
        self.renderer.render_triangles(mesh.subset(subset), transforms);
    }

    fn set_caption(&mut self, caption: &str) {
        if self.caption != caption {
            self.caption = caption.to_string();
        }
    }

    fn end_scene(&mut self) {
        self.in_scene = false;
    }

    fn present(&mut self) -> Result<(), DeviceError> {
        if self.session.is_none() {
            return Ok(());
        }
        let fps = self.fps.tick();
        queue!(self.out, cursor::MoveTo(0, 0))?;
        self.renderer.draw(&mut self.out)?;
        self.draw_status(fps)?;
        self.out.flush()?;
        Ok(())
    }
}
