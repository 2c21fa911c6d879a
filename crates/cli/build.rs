use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("pagepulse")
        .version(env!("CARGO_PKG_VERSION"))
        .author("PagePulse Contributors")
        .about("Diagnose landing-page conversion blockers")
        .arg(clap::arg!(<URL> "URL of the page to diagnose (http or https)"))
        .arg(clap::arg!(--json "Print the raw diagnosis JSON instead of the report"))
        .arg(clap::arg!(--timeout <SECS> "Page fetch timeout in seconds"))
        .arg(clap::arg!(--model <MODEL> "Model identifier override"))
        .arg(clap::arg!(--language <LANG> "Output language for the diagnosis (e.g. ja, en)"))
        .arg(clap::arg!(-v --verbose "Show per-stage progress on stderr"));

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "pagepulse", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "pagepulse", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "pagepulse", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "pagepulse", &completions_dir).unwrap();
}
