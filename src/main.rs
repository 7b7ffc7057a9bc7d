//! comport-panel command-line driver
//!
//! Runs the port panel without a GUI: the refresh loop, open/close and
//! settings persistence behave exactly as they would behind a form.
//!
//! ```bash
//! # List available serial ports
//! comport-panel ports
//!
//! # Show the saved settings
//! comport-panel show
//!
//! # Open a port, save the choice, and keep rescanning every second
//! comport-panel open --port /dev/ttyUSB0 --baud 115200 --auto-open true
//!
//! # Start like the panel does (auto-opening if saved) and watch for changes
//! MOCK_SERIAL=1 RUST_LOG=comport_panel_lib=debug comport-panel watch --ticks 10
//! ```

use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use crossbeam_channel::Receiver;

use comport_panel_lib::adapters::mock_serial::MockSerialFactory;
use comport_panel_lib::adapters::serial_port::SerialPortFactory;
use comport_panel_lib::adapters::settings_file::JsonSettingsFile;
use comport_panel_lib::domain::{DataBits, FlowControl, Parity, PortSettings, StopBits};
use comport_panel_lib::ports::{SerialFactory, SettingsStore};
use comport_panel_lib::{PanelEvent, PortPanel, RefreshReport, RefreshTimer};

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "comport-panel")]
#[command(version)]
#[command(about = "Pick, open and remember a serial port")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (defaults to the platform config directory)
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,

    /// Use simulated ports instead of real hardware (same as MOCK_SERIAL=1)
    #[arg(long, global = true)]
    mock: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List available serial ports
    Ports,

    /// Show the saved settings
    Show,

    /// Open a port with the given settings, then keep refreshing
    Open {
        #[command(flatten)]
        fields: FieldArgs,

        /// Stop after this many refresh ticks
        #[arg(long)]
        ticks: Option<u64>,
    },

    /// Start the panel (auto-opening if saved) and keep refreshing
    Watch {
        /// Stop after this many refresh ticks
        #[arg(long)]
        ticks: Option<u64>,
    },
}

/// Form fields; anything omitted keeps its loaded or default value
#[derive(Args)]
struct FieldArgs {
    /// Port name (e.g., /dev/ttyUSB0, COM3)
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate
    #[arg(short, long)]
    baud: Option<u32>,

    /// Data bits: 5, 6, 7 or 8
    #[arg(long)]
    data_bits: Option<DataBits>,

    /// Stop bits: 1, 1.5 or 2
    #[arg(long)]
    stop_bits: Option<StopBits>,

    /// Parity: none, even, odd, space or mark
    #[arg(long)]
    parity: Option<Parity>,

    /// Flow control: none, hardware or software
    #[arg(long)]
    flow_control: Option<FlowControl>,

    /// Reopen this port automatically on the next start
    #[arg(long)]
    auto_open: Option<bool>,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let mock = cli.mock || std::env::var("MOCK_SERIAL").is_ok_and(|v| v == "1");

    let result = if mock {
        run(&cli, MockSerialFactory::default())
    } else {
        run(&cli, SerialPortFactory)
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn settings_file(cli: &Cli) -> CliResult<JsonSettingsFile> {
    let path = match &cli.settings {
        Some(path) => path.clone(),
        None => JsonSettingsFile::default_path()
            .ok_or("no config directory found; pass --settings <PATH>")?,
    };
    Ok(JsonSettingsFile::new(path))
}

fn run<F: SerialFactory>(cli: &Cli, factory: F) -> CliResult<()> {
    match &cli.command {
        Commands::Ports => {
            let ports = factory.list_ports()?;
            if ports.is_empty() {
                println!("No serial ports found");
            }
            for port in ports {
                println!("{:<24} {}", port.name, port.port_type);
            }
            Ok(())
        }
        Commands::Show => {
            let store = settings_file(cli)?;
            match store.load()? {
                Some(entries) => println!("{}", PortSettings::from_map(&entries)?),
                None => println!("No saved settings in {}", store.path().display()),
            }
            Ok(())
        }
        Commands::Open { fields, ticks } => {
            let mut panel = PortPanel::new(factory, settings_file(cli)?);
            let events = panel.events();
            // A saved auto-open may already hold the port; reopen with the new fields
            panel.close();
            apply_fields(&mut panel, fields)?;
            if let Err(e) = panel.open() {
                print_events(&events);
                return Err(e.into());
            }
            run_loop(&mut panel, &events, *ticks);
            Ok(())
        }
        Commands::Watch { ticks } => {
            let mut panel = PortPanel::new(factory, settings_file(cli)?);
            let events = panel.events();
            println!("Ports: {:?}", panel.form().ports());
            println!("Settings: {}", panel.form().record());
            run_loop(&mut panel, &events, *ticks);
            Ok(())
        }
    }
}

fn apply_fields<F: SerialFactory, S: SettingsStore>(
    panel: &mut PortPanel<F, S>,
    fields: &FieldArgs,
) -> CliResult<()> {
    if let Some(port) = &fields.port {
        panel.select_port(port)?;
    }
    if let Some(baud) = fields.baud {
        panel.set_baud_rate(baud)?;
    }
    if let Some(data_bits) = fields.data_bits {
        panel.set_data_bits(data_bits)?;
    }
    if let Some(stop_bits) = fields.stop_bits {
        panel.set_stop_bits(stop_bits)?;
    }
    if let Some(parity) = fields.parity {
        panel.set_parity(parity)?;
    }
    if let Some(flow_control) = fields.flow_control {
        panel.set_flow_control(flow_control)?;
    }
    if let Some(auto_open) = fields.auto_open {
        panel.set_auto_open(auto_open)?;
    }
    Ok(())
}

fn run_loop<F: SerialFactory, S: SettingsStore>(
    panel: &mut PortPanel<F, S>,
    events: &Receiver<PanelEvent>,
    ticks: Option<u64>,
) {
    let mut timer = RefreshTimer::default();
    let mut done = 0u64;

    loop {
        print_events(events);
        if ticks.is_some_and(|limit| done >= limit) {
            break;
        }

        std::thread::sleep(timer.time_until_due(Instant::now()));
        if timer.is_due(Instant::now()) {
            print_report(&panel.refresh());
            done += 1;
        }
    }
}

fn print_events(events: &Receiver<PanelEvent>) {
    for event in events.try_iter() {
        match event {
            PanelEvent::PortOpenFailed { port, reason } => {
                println!("Cannot open {port}: {reason}")
            }
            PanelEvent::PortOpenStateChanged(open) => {
                println!("Port {}", if open { "open" } else { "closed" })
            }
            PanelEvent::PortOpened { port } => println!("Opened {port}"),
        }
    }
}

fn print_report(report: &RefreshReport) {
    for port in &report.ports.added {
        println!("+ {port}");
    }
    for port in &report.ports.removed {
        println!("- {port}");
    }
    if report.saved {
        println!("Settings saved");
    }
}
