//! Generates an Icinga2 `CheckCommand` definition from the clap command of the check.

pub struct CommandDescription {
    arguments: Vec<ArgumentDescription>,
}

pub struct ArgumentDescription {
    flag: String,
    var: String,
    description: Option<String>,
    is_flag: bool,
    required: bool,
    default_value: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ToIcingaCommandError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid executable path")]
    InvalidExecutablePath,
    #[error("error converting to command description: {0}")]
    CommandDescriptionFromError(#[from] CommandDescriptionFromError),
}

#[derive(Debug, thiserror::Error)]
pub enum CommandDescriptionFromError {
    #[error("argument '{0}' has no long flag")]
    MissingLongArgument(String),
}

impl CommandDescription {
    /// Builds the description, naming every custom variable `<name>_<long flag>`.
    pub fn from_command(name: &str, cmd: &clap::Command) -> Result<Self, CommandDescriptionFromError> {
        let mut arguments = Vec::new();

        for arg in cmd.get_arguments() {
            let long = arg
                .get_long()
                .ok_or_else(|| CommandDescriptionFromError::MissingLongArgument(arg.get_id().to_string()))?;

            let default_value = arg
                .get_default_values()
                .first()
                .and_then(|v| v.to_str())
                .map(|s| s.to_string());

            arguments.push(ArgumentDescription {
                flag: format!("--{}", long),
                var: format!("{}_{}", name, long.replace('-', "_")),
                description: arg.get_help().map(|s| s.to_string()),
                is_flag: !arg.get_action().takes_values(),
                required: arg.is_required_set(),
                default_value,
            });
        }

        Ok(CommandDescription { arguments })
    }

    pub fn to_icinga_command(&self, name: &str, executable: &str) -> String {
        let mut out = format!("object CheckCommand \"{}\" {{\n", name);
        out.push_str(&format!("  command = [ \"{}\" ]\n", escape_string(executable)));
        out.push_str("  arguments = {\n");

        for arg in &self.arguments {
            out.push_str(&format!("    \"{}\" = {{\n", arg.flag));

            if arg.is_flag {
                out.push_str(&format!("      set_if = \"${}$\"\n", arg.var));
            } else {
                out.push_str(&format!("      value = \"${}$\"\n", arg.var));
            }

            if let Some(ref description) = arg.description {
                out.push_str(&format!(
                    "      description = \"{}\"\n",
                    escape_string(description)
                ));
            }

            if arg.required {
                out.push_str("      required = true\n");
            }

            out.push_str("    }\n");
        }
        out.push_str("  }\n");

        let defaults: Vec<_> = self
            .arguments
            .iter()
            .filter_map(|arg| arg.default_value.as_ref().map(|d| (&arg.var, d)))
            .collect();
        if !defaults.is_empty() {
            out.push('\n');
        }
        for (var, default_value) in defaults {
            out.push_str(&format!(
                "  vars.{} = \"{}\"\n",
                var,
                escape_string(default_value)
            ));
        }

        out.push_str("}\n");
        out
    }
}

fn escape_string(s: &str) -> String {
    ["\\", "\"", "$"]
        .iter()
        .fold(s.to_string(), |acc, c| acc.replace(c, &format!("\\{}", c)))
}

/// Print the Icinga command configuration if the GENERATE_ICINGA_COMMAND environment variable is set
/// and exit the process.
pub fn print_icinga_command_config_if_env_and_exit(
    name: &str,
    cmd: &clap::Command,
) -> Result<(), ToIcingaCommandError> {
    if std::env::var_os("GENERATE_ICINGA_COMMAND").is_none() {
        return Ok(());
    }

    let description = CommandDescription::from_command(name, cmd)?;
    let current_exe = std::env::current_exe()?;
    let executable = current_exe
        .to_str()
        .ok_or(ToIcingaCommandError::InvalidExecutablePath)?;

    println!("{}", description.to_icinga_command(name, executable).trim());
    std::process::exit(0);
}
