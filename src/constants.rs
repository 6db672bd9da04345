// Layout units are the host's screen units; the defaults match a 2-D atom
// drawn with nucleons a few units across.
pub const DEFAULT_NUCLEON_RADIUS: f64 = 3.0;
pub const DEFAULT_INNER_SHELL_RADIUS: f64 = 85.0;
pub const DEFAULT_OUTER_SHELL_RADIUS: f64 = 130.0;

pub const INNER_SHELL_CAPACITY: usize = 2;
pub const OUTER_SHELL_CAPACITY: usize = 8;
