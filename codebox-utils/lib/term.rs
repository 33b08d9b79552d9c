//! Terminal glyphs used by the command line tools.

use std::sync::LazyLock;

use console::style;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// A green check mark
pub static CHECKMARK: LazyLock<String> = LazyLock::new(|| format!("{}", style("✓").green()));

/// A red cross mark
pub static CROSS: LazyLock<String> = LazyLock::new(|| format!("{}", style("✗").red()));
