//! Global constants for the Filla annotation editor

use std::time::Duration;

/// Quiet period after the last change before an autosave fires
pub const AUTOSAVE_DEBOUNCE: Duration = Duration::from_secs(2);

/// How long the "saved" status stays visible after a successful save
pub const SAVED_STATUS_DISPLAY: Duration = Duration::from_secs(1);

/// Maximum number of snapshots kept in the undo history
pub const HISTORY_LIMIT: usize = 100;

/// Minimum normalized width and height for a rectangle to be committed
pub const MIN_RECT_SIZE: f32 = 0.01;

/// Minimum normalized radius for a circle to be committed
pub const MIN_CIRCLE_RADIUS: f32 = 0.01;

/// Minimum normalized width for a text box to be committed
pub const MIN_TEXT_WIDTH: f32 = 0.05;

/// Minimum normalized length for an arrow to be committed
pub const MIN_ARROW_LENGTH: f32 = 0.01;

/// Extra hit radius (screen pixels) for mouse input
pub const MOUSE_HIT_TOLERANCE: f32 = 8.0;

/// Extra hit radius (screen pixels) for touch input
pub const TOUCH_HIT_TOLERANCE: f32 = 20.0;

/// Radius of a pin marker in screen pixels
pub const PIN_RADIUS: f32 = 12.0;

/// Approximate height of a text annotation used for hit-testing (screen pixels)
pub const TEXT_HIT_HEIGHT: f32 = 30.0;

/// Default font size for text annotations (screen pixels)
pub const TEXT_FONT_SIZE: f32 = 16.0;

/// Line height as a ratio of font size
pub const TEXT_LINE_HEIGHT_RATIO: f32 = 1.2;

/// Average glyph width as a ratio of font size (monospace estimate)
pub const TEXT_CHAR_WIDTH_RATIO: f32 = 0.6;

/// Padding around a soft text background (screen pixels)
pub const TEXT_BACKGROUND_PADDING: f32 = 4.0;

/// Placeholder text for newly drawn text annotations
pub const DEFAULT_TEXT: &str = "Text";

/// Dash pattern (on, off) for the selection highlight
pub const SELECTION_DASH: [f32; 2] = [6.0, 4.0];

/// Gap between an annotation and its selection highlight (screen pixels)
pub const SELECTION_PADDING: f32 = 4.0;

/// Arrowhead half-angle in radians (30 degrees)
pub const ARROW_HEAD_ANGLE: f32 = std::f32::consts::PI / 6.0;

/// Base arrowhead length in screen pixels, grown by stroke width
pub const ARROW_HEAD_BASE: f32 = 10.0;

/// Alpha applied to fill colors so the image stays visible underneath
pub const FILL_ALPHA: u8 = 0x40;

/// Default canvas size when the host has not reported one
pub const DEFAULT_CANVAS_SIZE: (u32, u32) = (1024, 768);
