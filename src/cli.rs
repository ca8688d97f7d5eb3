use clap::{Args, Parser, Subcommand};

/// BlendCalc: a fertilizer blend calculator that solves ingredient masses for a target
/// N-P-K-S-Ca composition.
#[derive(Parser, Debug)]
#[command(name = "blend_calc")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to the ingredient catalog JSON file.
    #[arg(short, long, global = true, default_value = "ingredients.json")]
    pub catalog: String,

    /// Path to the saved formulations JSON file.
    #[arg(long, global = true, default_value = "formulations.json")]
    pub formulations: String,

    /// Optional solver configuration JSON file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Log level (error, warn, info, debug, trace). RUST_LOG overrides it.
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Calculate a blend for a target composition.
    Calculate(CalculateArgs),

    /// List ingredients in the catalog.
    List {
        /// Include unavailable ingredients.
        #[arg(long)]
        all: bool,
    },

    /// Merge ingredients from a CSV file into the catalog.
    Import {
        /// CSV with header code,name,n,p,k,s,ca,cost_per_ton,available.
        csv: String,
    },

    /// Show saved formulations.
    History {
        /// Include archived formulations.
        #[arg(long)]
        all: bool,
    },

    /// Archive a saved formulation by code.
    Archive {
        /// Formulation code, e.g. FORM-1700000000000.
        code: String,
    },

    /// Mark an ingredient as available or unavailable.
    Availability {
        /// Ingredient code or name.
        code: String,

        #[arg(long, conflicts_with = "off")]
        on: bool,

        #[arg(long)]
        off: bool,
    },
}

/// Options for `calculate`. Anything left out is asked interactively.
#[derive(Args, Debug, Default, Clone)]
pub struct CalculateArgs {
    /// Target percentages, e.g. "N=10,K=30".
    #[arg(short, long)]
    pub target: Option<String>,

    /// Total batch mass in kg.
    #[arg(short, long)]
    pub mass: Option<f64>,

    /// Comma-separated candidate ingredient codes.
    #[arg(short, long, value_delimiter = ',')]
    pub ingredients: Vec<String>,

    /// Seed for the iterative method, for reproducible results.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Save a successful result under this formulation name.
    #[arg(long)]
    pub save: Option<String>,

    /// Free-text note stored with a saved formulation.
    #[arg(long, requires = "save")]
    pub description: Option<String>,

    /// Export the blend's line items to this CSV file.
    #[arg(long)]
    pub export: Option<String>,
}

impl CalculateArgs {
    /// True when every input was given on the command line.
    pub fn is_scripted(&self) -> bool {
        self.target.is_some() && !self.ingredients.is_empty()
    }
}

impl Default for Command {
    fn default() -> Self {
        Command::Calculate(CalculateArgs::default())
    }
}
