//! XML utilities.

mod utils;

pub use utils::{
    collect_text, element_children, find_child, find_children, find_descendant,
    find_descendants, get_tag_name, own_text, parse_document, tag_contains,
};
