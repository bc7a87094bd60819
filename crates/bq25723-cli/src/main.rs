mod settings;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use bq25723_core::{
    register_name, Bq25723, LoggingWire, Pins, Register, TwoWire, ValueFormat, ALTERNATE_ADDRESS,
    DEFAULT_ADDRESS,
};
use bq25723_sim::{SimulatedCharger, Snapshot};
use clap::{Args, Parser};
use settings::Settings;

fn main() -> Result<()> {
    use tracing_subscriber::prelude::*;

    let App { cmd, bus, output } = App::parse();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().without_time().with_writer(std::io::stderr))
        .with(output.trace_filter.clone())
        .init();

    let mut settings = Settings::load()?;
    if let Some(address) = bus.address {
        settings.address = address;
    }
    if let Some(clock) = bus.clock {
        settings.clock_hz = clock;
    }
    if let Some(format) = output.format {
        settings.format = format.as_str().to_string();
    }

    let mut chip = match &bus.snapshot {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading snapshot {}", path.display()))?;
            let snapshot: Snapshot = serde_json::from_str(&text)
                .with_context(|| format!("parsing snapshot {}", path.display()))?;
            SimulatedCharger::from_snapshot(&snapshot)
        }
        None => SimulatedCharger::default(),
    };
    log::debug!("simulated charger at {:#04x}", chip.address());

    let mut wire = LoggingWire::new(&mut chip, 4096);
    let result = run(cmd, &mut wire, &settings, bus.pins(), &mut std::io::stdout().lock());

    if output.show_bus {
        print!("{}", wire.log().to_text(true));
    }
    drop(wire);

    if output.frames {
        for frame in chip.frames() {
            println!(
                "{} {:02X} [{}] {}",
                if frame.rw { "R" } else { "W" },
                frame.address,
                hex::encode_upper(&frame.data),
                if frame.acked { "ack" } else { "nack" },
            );
        }
    }

    result
}

/// Register inspector for the TI BQ25723 charge controller.
///
/// Commands run against a simulated chip, optionally loaded from a JSON
/// register snapshot.
#[derive(Debug, Parser)]
#[clap(about, version)]
struct App {
    #[clap(subcommand)]
    cmd: Subcommand,

    #[clap(flatten)]
    bus: BusOptions,

    #[clap(flatten)]
    output: OutputOptions,
}

#[derive(Debug, Clone, Parser)]
enum Subcommand {
    /// Probe the default and alternate bus addresses.
    Scan,
    /// Read every named register.
    Dump,
    /// Read one register.
    Read {
        /// Register name (CHARGER_STATUS), hex (0x20) or decimal.
        #[clap(value_parser = parse_register)]
        register: u8,
    },
    /// Write one register and read it back.
    Write {
        #[clap(value_parser = parse_register)]
        register: u8,
        #[clap(value_parser = parse_value)]
        value: u16,
    },
    /// List the register table.
    Names,
    /// Show the effective settings.
    Config {
        /// Persist them as the new defaults.
        #[clap(long)]
        save: bool,
    },
}

#[derive(Clone, Debug, Args)]
#[command(next_help_heading = "Bus Options")]
struct BusOptions {
    /// 7-bit device address.
    #[clap(long, value_parser = parse_u8, global = true)]
    address: Option<u8>,

    /// Bus clock in Hz.
    #[clap(long, global = true)]
    clock: Option<u32>,

    /// Data line, together with --scl.
    #[clap(long, requires = "scl", global = true)]
    sda: Option<u8>,

    /// Clock line, together with --sda.
    #[clap(long, requires = "sda", global = true)]
    scl: Option<u8>,

    /// JSON register image to load into the simulated chip.
    #[clap(long, global = true)]
    snapshot: Option<PathBuf>,
}

impl BusOptions {
    fn pins(&self) -> Option<Pins> {
        Some(Pins {
            sda: self.sda?,
            scl: self.scl?,
        })
    }
}

#[derive(Clone, Debug, Args)]
#[command(next_help_heading = "Output Options")]
struct OutputOptions {
    /// Value format: hex, bin or dec.
    #[clap(long, value_parser = parse_format, global = true)]
    format: Option<ValueFormat>,

    /// Print the bus traffic after the command.
    #[clap(long, global = true)]
    show_bus: bool,

    /// Print the raw frames seen by the simulated chip.
    #[clap(long, global = true)]
    frames: bool,

    /// Log filter.
    #[clap(
        long = "log",
        alias = "trace",
        env = "RUST_LOG",
        default_value = "warn",
        global = true
    )]
    trace_filter: tracing_subscriber::filter::Targets,
}

fn run<W: TwoWire>(
    cmd: Subcommand,
    wire: &mut W,
    settings: &Settings,
    pins: Option<Pins>,
    out: &mut impl Write,
) -> Result<()> {
    let format = settings.value_format();
    let mut dev = Bq25723::with_config(wire, settings.driver_config());

    match cmd {
        Subcommand::Scan => {
            for address in [DEFAULT_ADDRESS, ALTERNATE_ADDRESS] {
                dev.set_address(address);
                let state = match dev.begin(pins) {
                    Ok(()) => "ack",
                    Err(_) => "no response",
                };
                writeln!(out, "{address:#04x}: {state}")?;
            }
        }
        Subcommand::Dump => {
            begin(&mut dev, pins)?;
            for reg in Register::ALL {
                match dev.read_register(reg) {
                    Ok(value) => writeln!(out, "{}", row(reg.addr(), Some(value), format))?,
                    Err(e) => writeln!(out, "{}  ({e})", row(reg.addr(), None, format))?,
                }
            }
        }
        Subcommand::Read { register } => {
            begin(&mut dev, pins)?;
            let value = dev
                .read_register(register)
                .with_context(|| format!("reading {register:#04x}"))?;
            writeln!(out, "{}", row(register, Some(value), format))?;
        }
        Subcommand::Write { register, value } => {
            begin(&mut dev, pins)?;
            dev.write_register(register, value)
                .with_context(|| format!("writing {register:#04x}"))?;
            let readback = dev
                .read_register(register)
                .with_context(|| format!("reading back {register:#04x}"))?;
            writeln!(out, "{}", row(register, Some(readback), format))?;
        }
        Subcommand::Names => {
            for reg in Register::ALL {
                writeln!(out, "{:#04x}  {}", reg.addr(), reg.name())?;
            }
        }
        Subcommand::Config { save } => {
            writeln!(out, "address  {:#04x}", settings.address)?;
            writeln!(out, "clock    {} Hz", settings.clock_hz)?;
            writeln!(out, "format   {}", format.as_str())?;
            if save {
                let path = settings.save()?;
                writeln!(out, "saved to {}", path.display())?;
            }
        }
    }
    Ok(())
}

fn begin<W: TwoWire>(dev: &mut Bq25723<'_, W>, pins: Option<Pins>) -> Result<()> {
    dev.begin(pins)
        .with_context(|| format!("initializing BQ25723 at {:#04x}", dev.address()))
}

fn row(addr: u8, value: Option<u16>, format: ValueFormat) -> String {
    let value = value.map(|v| format.render(v)).unwrap_or_else(|| "-".to_string());
    format!("{addr:#04x}  {:<18} {value}", register_name(addr))
}

fn parse_number(s: &str) -> Result<u32> {
    let s = s.trim().replace('_', "");
    let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else if let Some(bin) = s.strip_prefix("0b").or_else(|| s.strip_prefix("0B")) {
        u32::from_str_radix(bin, 2)
    } else {
        s.parse()
    };
    parsed.with_context(|| format!("`{s}` is not a number"))
}

fn parse_u8(s: &str) -> Result<u8> {
    let n = parse_number(s)?;
    u8::try_from(n).with_context(|| format!("{n:#x} does not fit in one byte"))
}

fn parse_value(s: &str) -> Result<u16> {
    let n = parse_number(s)?;
    u16::try_from(n).with_context(|| format!("{n:#x} does not fit in 16 bits"))
}

fn parse_format(s: &str) -> Result<ValueFormat> {
    match s.parse() {
        Ok(format) => Ok(format),
        Err(()) => bail!("`{s}` is not a value format (hex, bin, dec)"),
    }
}

fn parse_register(s: &str) -> Result<u8> {
    if let Ok(reg) = s.parse::<Register>() {
        return Ok(reg.addr());
    }
    match parse_u8(s) {
        Ok(addr) => Ok(addr),
        Err(_) => bail!("`{s}` is neither a register name nor an address"),
    }
}
