mod double_buffered;
mod screen_buffer;

pub use self::double_buffered::*;
pub use self::screen_buffer::*;
