pub mod formatter;

pub use formatter::{
    format_fuk_detail, format_json, format_json_list, format_result_tree, format_summary, format_value,
    should_use_colors,
};
