//! Console presentation: colour buffer quantisation and the presenter thread.
//!
//! Rendering and console output run on different threads. The render thread hands complete
//! frames to a `Presenter` through a single-slot mailbox, so a frame is never modified while
//! it is being written out.

use std::io::{self, Write};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, error, trace};
use nalgebra::Vector3;
use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::colour::{saturate, Colour};
use crate::error::PresentError;
use crate::framebuffer::ColourBuffer;
use crate::geometry::{Coordinate, Dimensions, HasDimensions};

/// The 16 colours of a standard console, in ANSI order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ConsoleColour {
    Black,
    DarkRed,
    DarkGreen,
    DarkYellow,
    DarkBlue,
    DarkMagenta,
    DarkCyan,
    Grey,
    DarkGrey,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl ConsoleColour {
    pub const ALL: [ConsoleColour; 16] = [
        ConsoleColour::Black,
        ConsoleColour::DarkRed,
        ConsoleColour::DarkGreen,
        ConsoleColour::DarkYellow,
        ConsoleColour::DarkBlue,
        ConsoleColour::DarkMagenta,
        ConsoleColour::DarkCyan,
        ConsoleColour::Grey,
        ConsoleColour::DarkGrey,
        ConsoleColour::Red,
        ConsoleColour::Green,
        ConsoleColour::Yellow,
        ConsoleColour::Blue,
        ConsoleColour::Magenta,
        ConsoleColour::Cyan,
        ConsoleColour::White,
    ];

    #[inline]
    pub fn index(self) -> u8 { self as u8 }

    pub fn rgb(self) -> Vector3<f32> {
        const DARK: f32 = 0.5;

        match self {
            ConsoleColour::Black => Vector3::new(0.0, 0.0, 0.0),
            ConsoleColour::DarkRed => Vector3::new(DARK, 0.0, 0.0),
            ConsoleColour::DarkGreen => Vector3::new(0.0, DARK, 0.0),
            ConsoleColour::DarkYellow => Vector3::new(DARK, DARK, 0.0),
            ConsoleColour::DarkBlue => Vector3::new(0.0, 0.0, DARK),
            ConsoleColour::DarkMagenta => Vector3::new(DARK, 0.0, DARK),
            ConsoleColour::DarkCyan => Vector3::new(0.0, DARK, DARK),
            ConsoleColour::Grey => Vector3::new(0.75, 0.75, 0.75),
            ConsoleColour::DarkGrey => Vector3::new(DARK, DARK, DARK),
            ConsoleColour::Red => Vector3::new(1.0, 0.0, 0.0),
            ConsoleColour::Green => Vector3::new(0.0, 1.0, 0.0),
            ConsoleColour::Yellow => Vector3::new(1.0, 1.0, 0.0),
            ConsoleColour::Blue => Vector3::new(0.0, 0.0, 1.0),
            ConsoleColour::Magenta => Vector3::new(1.0, 0.0, 1.0),
            ConsoleColour::Cyan => Vector3::new(0.0, 1.0, 1.0),
            ConsoleColour::White => Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// SGR parameter selecting this colour as the foreground
    #[inline]
    pub fn ansi_foreground(self) -> u8 {
        let index = self.index();

        if index < 8 { 30 + index } else { 90 + index - 8 }
    }

    #[inline]
    pub fn ansi_background(self) -> u8 { self.ansi_foreground() + 10 }
}

/// Shade glyphs and the fraction of the cell each covers with the foreground colour
pub const SHADES: [(char, f32); 5] = [
    (' ', 0.0),
    ('░', 0.25),
    ('▒', 0.5),
    ('▓', 0.75),
    ('█', 1.0),
];

/// One character cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub glyph: char,
    pub foreground: ConsoleColour,
    pub background: ConsoleColour,
}

impl Default for Cell {
    fn default() -> Cell {
        Cell { glyph: ' ', foreground: ConsoleColour::Grey, background: ConsoleColour::Black }
    }
}

/// Every glyph and colour pair combination with the colour it appears as
struct Quantiser {
    candidates: Vec<(Vector3<f32>, Cell)>,
}

impl Quantiser {
    fn new() -> Quantiser {
        let mut candidates = Vec::with_capacity(SHADES.len() * 16 * 16);

        for &(glyph, coverage) in SHADES.iter() {
            for &foreground in ConsoleColour::ALL.iter() {
                for &background in ConsoleColour::ALL.iter() {
                    let apparent = background.rgb() * (1.0 - coverage) + foreground.rgb() * coverage;

                    candidates.push((apparent, Cell { glyph, foreground, background }));
                }
            }
        }

        Quantiser { candidates }
    }

    /// The first candidate closest to `colour`. Alpha is ignored.
    fn nearest(&self, colour: Colour) -> Cell {
        let colour = saturate(colour).xyz();

        let mut best = Cell::default();
        let mut best_distance = f32::INFINITY;

        for &(apparent, cell) in &self.candidates {
            let distance = (apparent - colour).norm_squared();

            if distance < best_distance {
                best = cell;
                best_distance = distance;
            }
        }

        best
    }
}

/// A frame of character cells, ready to be written to a console
#[derive(Debug, Clone, PartialEq)]
pub struct CellGrid {
    dimensions: Dimensions,
    cells: Vec<Cell>,
}

impl HasDimensions for CellGrid {
    fn dimensions(&self) -> Dimensions { self.dimensions }
}

impl CellGrid {
    pub fn new(dimensions: Dimensions) -> CellGrid {
        CellGrid { dimensions, cells: vec![Cell::default(); dimensions.area()] }
    }

    /// Quantise every pixel to the glyph and palette pair that looks closest to it
    pub fn from_colour_buffer(buffer: &ColourBuffer) -> CellGrid {
        let quantiser = Quantiser::new();

        CellGrid {
            dimensions: buffer.dimensions(),
            cells: buffer.as_slice().iter().map(|&colour| quantiser.nearest(colour)).collect(),
        }
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] { &self.cells }

    pub fn get(&self, x: u32, y: u32) -> Option<Cell> {
        self.dimensions.index_of(Coordinate::new(x, y)).map(|index| self.cells[index])
    }

    pub fn set(&mut self, x: u32, y: u32, cell: Cell) -> bool {
        match self.dimensions.index_of(Coordinate::new(x, y)) {
            Some(index) => {
                self.cells[index] = cell;
                true
            }
            None => false,
        }
    }

    pub fn rows(&self) -> impl Iterator<Item=&[Cell]> {
        // chunks_exact panics on zero
        self.cells.chunks_exact(self.dimensions.width.max(1) as usize)
    }
}

/// Destination of presented frames
pub trait ConsoleSink {
    fn present(&mut self, grid: &CellGrid) -> io::Result<()>;
}

impl<F> ConsoleSink for F where F: FnMut(&CellGrid) -> io::Result<()> {
    fn present(&mut self, grid: &CellGrid) -> io::Result<()> { (self)(grid) }
}

/// Writes frames as ANSI escape sequences, redrawing from the top-left corner each time
#[derive(Debug)]
pub struct AnsiSink<W> {
    out: W,
    encoded: Vec<u8>,
}

impl<W: Write> AnsiSink<W> {
    pub fn new(out: W) -> AnsiSink<W> {
        AnsiSink { out, encoded: Vec::new() }
    }

    pub fn into_inner(self) -> W { self.out }
}

/// Encode `grid` into `out`, only emitting colour changes
pub fn encode_ansi_into(grid: &CellGrid, out: &mut Vec<u8>) -> io::Result<()> {
    out.extend_from_slice(b"\x1b[H");

    for row in grid.rows() {
        let mut current = None;

        for cell in row {
            let colours = (cell.foreground, cell.background);

            if current != Some(colours) {
                write!(out, "\x1b[{};{}m", cell.foreground.ansi_foreground(), cell.background.ansi_background())?;
                current = Some(colours);
            }

            write!(out, "{}", cell.glyph)?;
        }

        out.extend_from_slice(b"\x1b[0m\n");
    }

    Ok(())
}

impl<W: Write> ConsoleSink for AnsiSink<W> {
    fn present(&mut self, grid: &CellGrid) -> io::Result<()> {
        self.encoded.clear();

        encode_ansi_into(grid, &mut self.encoded)?;

        self.out.write_all(&self.encoded)?;
        self.out.flush()
    }
}

#[derive(Default)]
struct Mailbox {
    frame: Option<CellGrid>,
    busy: bool,
    closed: bool,
    presented: u64,
    error: Option<io::Error>,
}

#[derive(Default)]
struct Shared {
    mailbox: Mutex<Mailbox>,
    /// Signalled when a frame is posted or the presenter closes
    ready: Condvar,
    /// Signalled when the slot empties or a present finishes
    idle: Condvar,
}

/// Owns a presentation thread and the single-slot mailbox feeding it
pub struct Presenter {
    shared: Arc<Shared>,
    thread: Option<JoinHandle<()>>,
}

fn present_loop(shared: &Shared, mut sink: Box<dyn ConsoleSink + Send>) {
    let mut mailbox = shared.mailbox.lock();

    loop {
        while mailbox.frame.is_none() && !mailbox.closed {
            shared.ready.wait(&mut mailbox);
        }

        // Closing still presents a frame that was already posted
        let frame = match mailbox.frame.take() {
            Some(frame) => frame,
            None => break,
        };

        mailbox.busy = true;
        shared.idle.notify_all();

        let result = MutexGuard::unlocked(&mut mailbox, || sink.present(&frame));

        mailbox.busy = false;

        match result {
            Ok(()) => {
                mailbox.presented += 1;
                trace!("Presented frame {}", mailbox.presented);
            }
            Err(err) => {
                error!("Console sink failed, closing presenter: {}", err);

                mailbox.error = Some(err);
                mailbox.closed = true;
                mailbox.frame = None;
            }
        }

        shared.idle.notify_all();
    }

    debug!("Presenter thread exiting after {} frames", mailbox.presented);
}

impl Presenter {
    pub fn spawn<S>(sink: S) -> Result<Presenter, PresentError> where S: ConsoleSink + Send + 'static {
        let shared = Arc::new(Shared::default());
        let thread_shared = shared.clone();
        let sink: Box<dyn ConsoleSink + Send> = Box::new(sink);

        let thread = thread::Builder::new()
            .name("consolegl-present".to_owned())
            .spawn(move || present_loop(&thread_shared, sink))?;

        Ok(Presenter { shared, thread: Some(thread) })
    }

    /// The error that closed the mailbox, reported once
    fn closed_error(mailbox: &mut Mailbox) -> PresentError {
        match mailbox.error.take() {
            Some(err) => PresentError::Sink(err),
            None => PresentError::Closed,
        }
    }

    /// Hand over a frame, blocking while the previous one is still waiting to be presented
    pub fn submit(&self, frame: CellGrid) -> Result<(), PresentError> {
        let mut mailbox = self.shared.mailbox.lock();

        while mailbox.frame.is_some() && !mailbox.closed {
            self.shared.idle.wait(&mut mailbox);
        }

        if mailbox.closed {
            return Err(Self::closed_error(&mut mailbox));
        }

        mailbox.frame = Some(frame);
        self.shared.ready.notify_one();

        Ok(())
    }

    /// Hand over a frame unless one is already waiting, in which case `frame` is dropped.
    ///
    /// Returns whether the frame was accepted.
    pub fn try_submit(&self, frame: CellGrid) -> Result<bool, PresentError> {
        let mut mailbox = self.shared.mailbox.lock();

        if mailbox.closed {
            return Err(Self::closed_error(&mut mailbox));
        }

        if mailbox.frame.is_some() {
            trace!("Presenter busy, dropping frame");
            return Ok(false);
        }

        mailbox.frame = Some(frame);
        self.shared.ready.notify_one();

        Ok(true)
    }

    /// Block until every submitted frame has been presented
    pub fn wait_idle(&self) -> Result<(), PresentError> {
        let mut mailbox = self.shared.mailbox.lock();

        while (mailbox.frame.is_some() || mailbox.busy) && !mailbox.closed {
            self.shared.idle.wait(&mut mailbox);
        }

        if mailbox.closed {
            return Err(Self::closed_error(&mut mailbox));
        }

        Ok(())
    }

    /// Number of frames written out so far
    pub fn presented(&self) -> u64 {
        self.shared.mailbox.lock().presented
    }

    fn close(&mut self) -> Result<(), PresentError> {
        let thread = match self.thread.take() {
            Some(thread) => thread,
            None => return Ok(()),
        };

        {
            let mut mailbox = self.shared.mailbox.lock();

            mailbox.closed = true;
            self.shared.ready.notify_all();
        }

        if thread.join().is_err() {
            error!("Presenter thread panicked");
            return Err(PresentError::Closed);
        }

        match self.shared.mailbox.lock().error.take() {
            Some(err) => Err(PresentError::Sink(err)),
            None => Ok(()),
        }
    }

    /// Present any frame still waiting, then stop the thread
    pub fn shutdown(mut self) -> Result<(), PresentError> {
        self.close()
    }
}

impl Drop for Presenter {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            error!("Presenter shut down with an error: {}", err);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn grid_of(colours: &[Colour], width: u32) -> CellGrid {
        let mut buffer = ColourBuffer::new(Dimensions::new(width, colours.len() as u32 / width), Colour::zeros());

        for (index, &colour) in colours.iter().enumerate() {
            *buffer.pixel_mut(index) = colour;
        }

        CellGrid::from_colour_buffer(&buffer)
    }

    #[test]
    fn test_quantise_palette_colours() {
        let grid = grid_of(&[
            Colour::new(1.0, 0.0, 0.0, 1.0),
            Colour::new(0.0, 0.0, 0.0, 1.0),
            Colour::new(1.0, 1.0, 1.0, 1.0),
            Colour::new(0.5, 0.0, 0.0, 1.0),
        ], 2);

        assert_eq!(grid.get(0, 0), Some(Cell { glyph: ' ', foreground: ConsoleColour::Black, background: ConsoleColour::Red }));
        assert_eq!(grid.get(1, 0).map(|cell| cell.background), Some(ConsoleColour::Black));
        assert_eq!(grid.get(0, 1).map(|cell| cell.background), Some(ConsoleColour::White));
        assert_eq!(grid.get(1, 1).map(|cell| cell.background), Some(ConsoleColour::DarkRed));
        assert_eq!(grid.get(2, 0), None);
    }

    #[test]
    fn test_quantise_uses_shades_between_colours() {
        // No palette entry is this dark grey, so a shade glyph has to mix one
        let grid = grid_of(&[Colour::new(0.25, 0.25, 0.25, 1.0)], 1);
        let cell = grid.get(0, 0).unwrap();

        let (_, coverage) = SHADES.iter().find(|(glyph, _)| *glyph == cell.glyph).copied().unwrap();
        let apparent = cell.background.rgb() * (1.0 - coverage) + cell.foreground.rgb() * coverage;

        assert!((apparent - Vector3::new(0.25, 0.25, 0.25)).norm() < 0.05);
        assert_ne!(cell.glyph, ' ');
    }

    #[test]
    fn test_ansi_encoding() {
        let mut grid = CellGrid::new(Dimensions::new(2, 1));

        grid.set(1, 0, Cell { glyph: '█', foreground: ConsoleColour::Red, background: ConsoleColour::Black });

        let mut out = Vec::new();
        encode_ansi_into(&grid, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();

        assert_eq!(text, "\x1b[H\x1b[37;40m \x1b[91;40m█\x1b[0m\n");
    }

    #[test]
    fn test_frames_are_presented_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = seen.clone();

        let presenter = Presenter::spawn(move |grid: &CellGrid| -> io::Result<()> {
            sink_seen.lock().push(grid.dimensions().width);
            Ok(())
        }).unwrap();

        for width in 1..=3 {
            presenter.submit(CellGrid::new(Dimensions::new(width, 1))).unwrap();
        }

        presenter.wait_idle().unwrap();

        assert_eq!(presenter.presented(), 3);
        assert_eq!(*seen.lock(), vec![1, 2, 3]);

        presenter.shutdown().unwrap();
    }

    #[test]
    fn test_try_submit_drops_when_slot_is_full() {
        let gate = Arc::new((Mutex::new(false), Condvar::new()));
        let sink_gate = gate.clone();

        let presenter = Presenter::spawn(move |_: &CellGrid| -> io::Result<()> {
            let (ref open, ref signal) = *sink_gate;
            let mut open = open.lock();

            while !*open {
                signal.wait(&mut open);
            }

            Ok(())
        }).unwrap();

        // The second submit returns once the first frame is being presented
        presenter.submit(CellGrid::new(Dimensions::new(1, 1))).unwrap();
        presenter.submit(CellGrid::new(Dimensions::new(1, 1))).unwrap();

        assert_eq!(presenter.try_submit(CellGrid::new(Dimensions::new(1, 1))).unwrap(), false);

        {
            let (ref open, ref signal) = *gate;
            *open.lock() = true;
            signal.notify_all();
        }

        presenter.wait_idle().unwrap();
        assert_eq!(presenter.presented(), 2);
    }

    #[test]
    fn test_sink_error_closes_presenter() {
        let presenter = Presenter::spawn(|_: &CellGrid| -> io::Result<()> { Err(io::Error::new(io::ErrorKind::BrokenPipe, "console closed")) }).unwrap();

        presenter.submit(CellGrid::new(Dimensions::new(1, 1))).unwrap();

        match presenter.wait_idle() {
            Err(PresentError::Sink(err)) => assert_eq!(err.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("unexpected {:?}", other),
        }

        match presenter.submit(CellGrid::new(Dimensions::new(1, 1))) {
            Err(PresentError::Closed) => (),
            other => panic!("unexpected {:?}", other),
        }
    }
}
