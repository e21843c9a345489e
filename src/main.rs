use std::{path::PathBuf, process::ExitCode};

use argh::FromArgValue;
use treegen::{Options, Registry, generate, output};

fn main() -> ExitCode {
    env_logger::init();

    let args: Args = argh::from_env();
    run(args)
}

#[derive(argh::FromArgs)]
/// Generate typed tree accessors from a declaration file.
struct Args {
    /// declaration file
    #[argh(positional)]
    infile: PathBuf,

    /// output file, or `-` for stdout
    #[argh(positional)]
    outfile: PathBuf,

    /// register an externally defined token leaf
    #[argh(option)]
    token: Vec<String>,

    /// register an externally defined enum holding nodes and tokens
    #[argh(option)]
    polymorphic: Vec<String>,

    /// map a type to a differently named tag, as `Type=Tag`
    #[argh(option)]
    alias: Vec<Alias>,

    /// token leaf whose cast also accepts the empty token
    #[argh(option)]
    nullable: Vec<String>,

    /// text emitted before the bindings, instead of the default `use` line
    #[argh(option)]
    prelude: Option<String>,

    /// do not emit the `AstNode` and `AstToken` traits
    #[argh(switch, long = "no-runtime")]
    no_runtime: bool,

    /// run rustfmt on the output file
    #[argh(switch)]
    rustfmt: bool,
}

struct Alias {
    name: String,
    tag: String,
}

impl FromArgValue for Alias {
    fn from_arg_value(value: &str) -> Result<Self, String> {
        let Some((name, tag)) = value.split_once('=') else {
            return Err(format!("expected `Type=Tag`, got `{value}`"));
        };
        let (name, tag) = (name.trim(), tag.trim());
        if name.is_empty() || tag.is_empty() {
            return Err(format!("expected `Type=Tag`, got `{value}`"));
        }
        Ok(Alias {
            name: name.into(),
            tag: tag.into(),
        })
    }
}

macro_rules! bail {
    ($($tt:tt)*) => {{
        eprintln!($($tt)*);
        return ExitCode::FAILURE;
    }};
}

fn run(args: Args) -> ExitCode {
    let mut registry = Registry::builder();
    for name in args.token {
        registry = registry.token_leaf(name);
    }
    for name in args.polymorphic {
        registry = registry.polymorphic(name);
    }
    for Alias { name, tag } in args.alias {
        registry = registry.alias(name, tag);
    }
    for name in args.nullable {
        registry = registry.nullable(name);
    }
    let registry = registry.build();

    let mut options = Options::default();
    if let Some(prelude) = args.prelude {
        options.prelude = prelude;
    }
    options.runtime = !args.no_runtime;

    let src = match output::read_source(&args.infile) {
        Ok(src) => src,
        Err(err) => bail!("{err}"),
    };

    let out = match generate(&src, &registry, &options) {
        Ok(out) => out,
        Err(report) => bail!("{}", report.render(&src)),
    };

    let written = if args.rustfmt {
        output::write_formatted_artifact(&args.outfile, &out.code)
    } else {
        output::write_artifact(&args.outfile, &out.code)
    };
    if let Err(err) = written {
        bail!("{err}");
    }

    if !out.report.is_empty() {
        bail!("{}", out.report.render(&src));
    }

    ExitCode::SUCCESS
}
