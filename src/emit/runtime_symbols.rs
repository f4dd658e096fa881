//! The fixed runtime symbol table consumed by [`crate::emit::c_emitter`].
//! These names are never invented by the emitter — they are the complete,
//! documented contract with the (out-of-scope) runtime library.

/// A runtime-provided C function the emitter is allowed to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeSymbol {
    pub name: &'static str,
    pub category: &'static str,
}

macro_rules! symbols {
    ($($category:literal => [$($name:literal),+ $(,)?]),+ $(,)?) => {
        pub static SYMBOLS: &[RuntimeSymbol] = &[
            $($(RuntimeSymbol { name: $name, category: $category },)+)+
        ];
    };
}

symbols! {
    "buffer" => ["daisy_buffer_create", "daisy_buffer_release"],
    "view" => ["daisy_view_borrow", "daisy_view_release"],
    "tensor" => ["daisy_tensor_create", "daisy_tensor_release", "daisy_tensor_matmul"],
    "channel" => [
        "daisy_channel_create",
        "daisy_channel_send",
        "daisy_channel_recv",
        "daisy_channel_close",
        "daisy_channel_release",
    ],
    "vector" => [
        "daisy_vector_new",
        "daisy_vector_push",
        "daisy_vector_get",
        "daisy_vector_len",
        "daisy_vector_release",
    ],
    "string" => [
        "daisy_string_len",
        "daisy_string_concat",
        "daisy_string_substr",
        "daisy_string_trim",
        "daisy_string_find",
        "daisy_string_starts_with",
        "daisy_string_char_at",
        "daisy_string_to_int",
        "daisy_string_release",
    ],
    "file" => [
        "daisy_file_read",
        "daisy_file_write",
        "daisy_file_exists",
        "daisy_file_delete",
        "daisy_file_move",
        "daisy_file_copy",
    ],
    "directory" => ["daisy_dir_create", "daisy_dir_exists"],
    "logging" => ["daisy_log_set_level", "daisy_log_info", "daisy_log_warn", "daisy_log_error"],
    "network" => [
        "daisy_net_connect",
        "daisy_net_send",
        "daisy_net_recv",
        "daisy_net_close",
    ],
    "thread" => ["daisy_thread_spawn"],
    "convert" => ["daisy_int_to_string", "daisy_bool_to_string"],
    "error" => ["daisy_last_error", "daisy_panic"],
    "result" => [
        "daisy_result_ok",
        "daisy_result_err",
        "daisy_result_is_ok",
        "daisy_result_unwrap",
    ],
    "option" => [
        "daisy_option_some",
        "daisy_option_none",
        "daisy_option_is_some",
        "daisy_option_unwrap",
    ],
    "print" => ["daisy_print"],
}

/// Bound on the size of a file the runtime will read into a buffer.
pub const MAX_FILE_SIZE_BYTES: u64 = 64 * 1024 * 1024;

/// Bound on a single `daisy_net_recv` call.
pub const MAX_NETWORK_READ_BYTES: u64 = 4 * 1024 * 1024;

pub fn find(name: &str) -> Option<&'static RuntimeSymbol> {
    SYMBOLS.iter().find(|s| s.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_symbol_is_findable_by_name() {
        for symbol in SYMBOLS {
            assert_eq!(find(symbol.name), Some(symbol));
        }
    }

    #[test]
    fn unknown_symbol_is_not_found() {
        assert_eq!(find("daisy_does_not_exist"), None);
    }

    #[test]
    fn bounds_match_the_documented_limits() {
        assert_eq!(MAX_FILE_SIZE_BYTES, 64 * 1024 * 1024);
        assert_eq!(MAX_NETWORK_READ_BYTES, 4 * 1024 * 1024);
    }
}
