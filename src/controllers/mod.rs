// Headless widget state
// Controllers hold all widget logic; components only wire them to the DOM

pub mod content_area;
pub mod picker;
pub mod popup;

pub use content_area::{ContentEvent, ContentLengthState, EditableContentArea, KeyAction};
pub use picker::{EmojiPicker, PickerEvent, PickerTab, PickerView};
pub use popup::{PopupController, PopupState};
