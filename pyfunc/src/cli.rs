use clap::{Args, Parser, Subcommand};

/// pyfunc - call functions defined in Python scripts
#[derive(Parser, Debug)]
#[command(name = "pyfunc")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Target function plus its arguments, shared by `call` and `script`.
#[derive(Args, Debug)]
pub struct CallTarget {
    /// Path to the Python script defining the function
    #[arg(value_name = "SCRIPT")]
    pub script: String,

    /// Name of the function to call
    #[arg(value_name = "FUNC")]
    pub function: String,

    /// Positional argument as JSON (repeatable, in order)
    #[arg(short = 'a', long = "arg", value_name = "JSON")]
    pub args: Vec<String>,

    /// Keyword argument as NAME=JSON (repeatable)
    #[arg(short = 'k', long = "kwarg", value_name = "NAME=JSON")]
    pub kwargs: Vec<String>,

    /// Prefix prepended to all template tokens for this call
    #[arg(long, value_name = "PREFIX")]
    pub token_prefix: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Call a function and print its JSON result
    Call {
        #[command(flatten)]
        target: CallTarget,

        /// Interpreter executable (default: from env or python3)
        #[arg(long, value_name = "EXE", env = "PYFUNC_PYTHON")]
        python: Option<String>,

        /// Kill the interpreter after this many seconds (default: from env or none)
        #[arg(long)]
        timeout: Option<u64>,

        /// Print the full diagnostic report instead of the bare result
        #[arg(long, default_value = "false")]
        inspect: bool,
    },

    /// Print the program that would be run, without running it
    Script {
        #[command(flatten)]
        target: CallTarget,
    },

    /// Show the import specifier and extra search path for a script
    Resolve {
        #[arg(value_name = "SCRIPT")]
        script: String,
    },

    /// Print the active template tokens and interpreter as JSON
    Tokens,
}
