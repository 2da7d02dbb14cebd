//! Command-line options.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};

pub const USAGE: &str = "\
usage: venue [TOPOLOGY_JSON] [--config FILE] [--fast-forward-after MS]
             [--out DIR] [--realtime] [--max-ms MS]";

#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    /// Event document; the bundled sample when absent.
    pub topology:           Option<PathBuf>,
    /// `FlowConfig` as JSON; defaults when absent.
    pub config:             Option<PathBuf>,
    /// Virtual time at which the operator presses fast-forward.
    pub fast_forward_after: u64,
    pub out_dir:            PathBuf,
    /// Sleep between ticks so virtual time tracks wall time.
    pub realtime:           bool,
    /// Give up if the event has not ended by this virtual time.
    pub max_ms:             u64,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            topology:           None,
            config:             None,
            fast_forward_after: 10_000,
            out_dir:            PathBuf::from("output/venue"),
            realtime:           false,
            max_ms:             600_000,
        }
    }
}

impl Args {
    pub fn from_env() -> Result<Self> {
        Self::parse(std::env::args().skip(1))
    }

    pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Self> {
        let mut out = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => out.config = Some(PathBuf::from(value(&mut args, &arg)?)),
                "--out" => out.out_dir = PathBuf::from(value(&mut args, &arg)?),
                "--realtime" => out.realtime = true,
                "--fast-forward-after" => out.fast_forward_after = millis(&mut args, &arg)?,
                "--max-ms" => out.max_ms = millis(&mut args, &arg)?,
                "-h" | "--help" => bail!("{USAGE}"),
                flag if flag.starts_with("--") => bail!("unknown option {flag}\n{USAGE}"),
                path => {
                    if out.topology.is_some() {
                        bail!("more than one topology file given\n{USAGE}");
                    }
                    out.topology = Some(PathBuf::from(path));
                }
            }
        }
        Ok(out)
    }
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next().with_context(|| format!("{flag} needs a value"))
}

fn millis(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<u64> {
    let raw = value(args, flag)?;
    raw.parse().with_context(|| format!("{flag}: `{raw}` is not a millisecond count"))
}
