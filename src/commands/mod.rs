pub mod checkout;
pub mod doctor;
pub mod fix_git;
pub mod list;
pub mod refresh;

pub use checkout::*;
pub use doctor::*;
pub use fix_git::*;
pub use list::*;
pub use refresh::*;
