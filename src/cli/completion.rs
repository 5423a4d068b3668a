//! Shell completion generation for indexsheet
//!
//! Produces clap_complete scripts for bash, zsh and fish. The bash and fish
//! scripts also suggest the default report fields for `-r/--report-fields`.

use clap::CommandFactory;
use clap_complete::{Shell, generate};
use std::io::{self, Write};

use crate::cli::CliArgs;
use crate::error::{ConfigError, Result};
use crate::model::DEFAULT_REPORT_FIELDS;

const BIN_NAME: &str = "indexsheet";

/// Print the completion script for `shell_name` to stdout
///
/// # Arguments
/// * `shell_name` - Shell type (bash, zsh, fish)
///
/// # Returns
/// * `Result<()>` - Success or error
pub fn generate_completion(shell_name: &str) -> Result<()> {
    let shell = parse_shell(shell_name)?;
    let mut stdout = io::stdout().lock();
    write_completion(shell, &mut stdout)
}

/// Write the completion script for `shell` to `out`
pub fn write_completion(shell: Shell, out: &mut dyn Write) -> Result<()> {
    let mut cmd = CliArgs::command();
    let mut buffer = Vec::new();
    generate(shell, &mut cmd, BIN_NAME, &mut buffer);

    let script = String::from_utf8_lossy(&buffer);
    let extra = match shell {
        Shell::Bash => bash_field_completion(),
        Shell::Fish => fish_field_completion(),
        _ => String::new(),
    };

    write!(out, "{}{}", script, extra).map_err(|e| {
        ConfigError::Generic(format!("Failed to write completion script: {}", e))
    })?;
    Ok(())
}

/// Parse shell name string to Shell enum
fn parse_shell(shell_name: &str) -> Result<Shell> {
    match shell_name.to_lowercase().as_str() {
        "bash" => Ok(Shell::Bash),
        "zsh" => Ok(Shell::Zsh),
        "fish" => Ok(Shell::Fish),
        _ => Err(ConfigError::Generic(format!(
            "Unsupported shell: {}. Supported shells: bash, zsh, fish",
            shell_name
        ))
        .into()),
    }
}

fn bash_field_completion() -> String {
    format!(
        r#"
# Suggest the default report fields after -r/--report-fields
_indexsheet_enhanced() {{
    local cur prev
    cur="${{COMP_WORDS[COMP_CWORD]}}"
    prev="${{COMP_WORDS[COMP_CWORD-1]}}"

    if [[ "$prev" == "-r" || "$prev" == "--report-fields" ]]; then
        COMPREPLY=($(compgen -W "{fields}" -- "$cur"))
        return 0
    fi

    _indexsheet "$@"
}}

complete -F _indexsheet_enhanced -o bashdefault -o default {bin}
"#,
        fields = DEFAULT_REPORT_FIELDS.join(" "),
        bin = BIN_NAME
    )
}

fn fish_field_completion() -> String {
    format!(
        r#"
# Suggest the default report fields after -r/--report-fields
complete -c {bin} -n "__fish_seen_subcommand_from dump-index" \
    -s r -l report-fields -f -a "{fields}" -d "Default report field"
"#,
        fields = DEFAULT_REPORT_FIELDS.join(" "),
        bin = BIN_NAME
    )
}
