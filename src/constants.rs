// src/constants.rs

/// The name of the ociguard configuration directory (under the platform config dir).
pub const CONFIG_DIR_NAME: &str = "ociguard";

/// Overrides the configuration directory entirely when set.
pub const CONFIG_DIR_ENV: &str = "OCIGUARD_CONFIG_DIR";

/// The name of the main configuration file (inside the config dir).
pub const CONFIG_FILENAME: &str = "config.toml";

/// The default env file holding local variable overrides.
pub const ENV_FILENAME: &str = ".env";

/// The default directory holding one template per command signature.
pub const TEMPLATES_DIRNAME: &str = "templates";

/// Filename of the shared schema library, ignored during template listing.
pub const COMMON_SCHEMAS_FILENAME: &str = "common_schemas.yaml";

/// Extension used by template files.
pub const TEMPLATE_EXTENSION: &str = "yaml";

/// Number of leading non-flag tokens that identify a template.
pub const DEFAULT_SIGNATURE_LENGTH: usize = 4;

/// Flags that expect a local file path as their next argument.
pub const DEFAULT_FILE_PATH_FLAGS: &[&str] = &[
    "--ssh-authorized-keys-file",
    "--file",
    "--from-json",
    "--actions",
];

/// Environment variable overridden for the spawned process only.
pub const DEFAULT_PAGER_ENV_VAR: &str = "PAGER";
pub const DEFAULT_PAGER_VALUE: &str = "cat";

/// Prefix that marks a value as "read JSON from this file".
pub const FILE_URL_PREFIX: &str = "file://";

/// Namespace in the common schema document holding identifier schemas.
pub const COMMON_ARGS_NAMESPACE: &str = "common_oci_args";

/// Prefix of every OCI identifier.
pub const OCID_PREFIX: &str = "ocid1.";

// --- Redaction ---

pub const OCID_PATTERN: &str = r"(?i)ocid1\.[a-z0-9]+\.oc[0-9]+\.[a-z0-9-]*\.[a-z0-9]+";
pub const IP_PATTERN: &str = r"\b(?:[0-9]{1,3}\.){3}[0-9]{1,3}\b";
pub const REDACTED_OCID: &str = "[REDACTED_OCID]";
pub const REDACTED_IP: &str = "[REDACTED_IP]";

// --- Exit codes ---

/// Pipeline-local failures (resolution, pre-flight, template, validation).
/// The OCI CLI exits 1 and 2 itself (2 for click usage errors), so this has
/// to sit outside that range: 64 is `EX_USAGE` from `sysexits.h`.
pub const EXIT_PIPELINE_FAILURE: i32 = 64;

/// Synthetic code reported when the target CLI could not be launched at all.
pub const EXIT_LAUNCH_FAILURE: i32 = 127;

/// Reported when the target CLI was terminated by a signal and has no exit code.
pub const EXIT_SIGNALLED: i32 = 128;
