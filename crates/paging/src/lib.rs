//! # Paging Crate
//!
//! Pure pagination derivation: turns the scheduler's `PaginationInfo` into
//! everything the pagination strip renders.
//!
//! ## Example Usage
//!
//! ```ignore
//! use model::PaginationInfo;
//! use paging::PageWindow;
//!
//! let info = PaginationInfo::derive(1, 20, 47);
//! let window = PageWindow::compute(&info).expect("more than one page");
//!
//! assert_eq!(window.pages, vec![1, 2, 3]);
//! assert_eq!(window.range_text(), "1–20 of 47");
//! ```

pub mod window;

pub use window::{MAX_WINDOW, PageWindow};
