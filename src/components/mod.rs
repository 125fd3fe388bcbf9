pub mod icons;
pub mod popup_emoji;
pub mod twemoji_picker;
pub mod twemoji_textarea;

pub use icons::{SearchIcon, SendIcon};
pub use popup_emoji::PopupEmoji;
pub use twemoji_picker::TwemojiPicker;
pub use twemoji_textarea::TwemojiTextarea;
