pub mod circuit;
pub mod cover;
mod error;
pub mod interval;
mod options;
mod statistic;
pub mod tpg;

pub use error::{Error, Result};
pub use options::{Options, Strategy};
pub use tpg::{Summary, Tpg};

use logic_form::{Lit, Var};

#[inline]
pub(crate) fn plit(var: usize, polarity: bool) -> Lit {
    Lit::new(Var::new(var), polarity)
}
