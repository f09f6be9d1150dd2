pub const MARK_ROWS: std::ops::Range<usize> = 0..1;
pub const MARK_COUNTER_COLUMN: usize = 0;
pub const MARK_FLAGS_COLUMN: usize = 1;
pub const MARK_MIN_COLUMNS: usize = 2;

pub const OVERTRIG_SHIFT: u32 = 16;
pub const OVERTRIG_MASK: u32 = 0xff;
pub const ENABLE_SHIFT: u32 = 30;
pub const ENABLE_MASK: u32 = 0x01;

pub const RGB_BLUE_SHIFT: u32 = 24;
pub const RGB_GREEN_SHIFT: u32 = 16;
pub const RGB_RED_SHIFT: u32 = 8;
pub const RGB_CHANNEL_MASK: u32 = 0xff;
pub const RGB_CHANNELS: u64 = 3;
