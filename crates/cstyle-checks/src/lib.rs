//! # cstyle-checks
//!
//! Built-in checks for cstyle.
//!
//! This crate provides the checks run over student C programs, from plain
//! construct bans to the indentation analyzer.
//!
//! ## Available Checks
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | CS001 | `array` | Array declared |
//! | CS002 | `break` | `break` statement used |
//! | CS003 | `comma` | Comma operator used |
//! | CS004 | `continue` | `continue` statement used |
//! | CS005 | `do_while` | `do while` loop used |
//! | CS006 | `global_variable` | Mutable global variable declared |
//! | CS007 | `goto` | `goto` statement used |
//! | CS008 | `multiple_malloc` | Allocation called from more than one location |
//! | CS009 | `non_char_array` | Array with a non-char element type declared |
//! | CS010 | `static_local_variable` | Mutable static local declared |
//! | CS011 | `string_library` | Function from `string.h` used |
//! | CS012 | `switch` | `switch` statement used |
//! | CS013 | `ternary` | `?:` operator used |
//! | CS014 | `union` | Union declared |
//! | CS015 | `unistd_library` | Function from `unistd.h` used |
//! | CS016 | `assign_getchar_char` | `getchar`-family result stored in a `char` |
//! | CS017 | `indenting` | Inconsistent indentation or tab/space mixture |
//! | CS018 | `integer_ascii_code` | Integer literal used for an ASCII code |
//!
//! ## Usage
//!
//! ```ignore
//! use cstyle_checks::registry;
//!
//! let mut engine = Engine::new(frontend, policy);
//! for check in registry::node_checks() {
//!     engine = engine.with_node_check(check);
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod calls;
mod char_flow;
mod constructs;
mod declarations;
mod indent;

/// Static name-to-implementation registry.
pub mod registry;

pub use calls::{LibraryUse, MultipleMalloc};
pub use char_flow::{AssignGetcharChar, IntegerAsciiCode};
pub use constructs::{CommaOperator, KindCheck};
pub use declarations::{ArrayDecl, GlobalVariable, NonCharArray, StaticLocalVariable};
pub use indent::{BodyIndent, TabsSpaces};

/// Re-export core types for convenience.
pub use cstyle_core::{CheckName, NodeCheck, Severity};
