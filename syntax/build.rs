use std::path::{Path, PathBuf};

use treegen::{Options, Registry};

fn main() {
    let infile = Path::new("src/nodes.ast");
    println!("cargo::rerun-if-changed={}", infile.display());

    let src = std::fs::read_to_string(infile).unwrap();
    let registry = Registry::builder()
        .alias("Str", "String")
        .alias("Int", "Number")
        .alias("EmptyStmt", "Semicolon")
        .nullable("Ident")
        .build();

    let out = match treegen::generate(&src, &registry, &Options::default()) {
        Ok(out) if out.report.is_empty() => out,
        Ok(out) => panic!("\n{}", out.report.render(&src)),
        Err(report) => panic!("\n{}", report.render(&src)),
    };

    let outfile = PathBuf::from(std::env::var_os("OUT_DIR").unwrap()).join("nodes.rs");
    treegen::output::write_artifact(&outfile, &out.code).unwrap();
}
