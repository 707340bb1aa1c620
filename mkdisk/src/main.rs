use clap::{Parser, Subcommand, ValueEnum};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use geekboard::clock::StdClock;
use geekboard::constants::{SECTORS_PER_TRACK, SECTOR_SIZE, TRACKS};
use geekboard::logger::{init_logger, StderrSink};
use geekboard::machine::{PanelSource, Reg};
use geekboard::settings::MachineSettings;
use geekboard::{
    AtomicMachine, ColorDepth, CpuKind, DisplayConfig, DisplayTask, DrawFn, HeadlessDisplay, Lcd, StatusMode, Telemetry,
};

/// Fill byte of a freshly formatted CP/M disk
const EMPTY_BYTE: u8 = 0xe5;

#[derive(Parser)]
#[command(about = "Disk images, settings files and LCD previews for the GEEK board")]
struct Args {
    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a blank disk image
    Format {
        /// Output image path
        #[arg(short, long)]
        output: PathBuf,

        #[arg(long, default_value_t = TRACKS)]
        tracks: u8,

        #[arg(long, default_value_t = SECTORS_PER_TRACK)]
        sectors: u8,
    },
    /// Show a saved settings file, or write a default one
    Settings {
        file: PathBuf,

        /// Write default settings instead of reading
        #[arg(long)]
        init: bool,
    },
    /// Render a status page to a PPM image
    Preview {
        #[arg(short, long, value_enum, default_value_t = PreviewPage::Registers)]
        page: PreviewPage,

        #[arg(short, long, value_enum, default_value_t = Depth::Rgb444)]
        depth: Depth,

        #[arg(long, value_enum, default_value_t = Cpu::Z80)]
        cpu: Cpu,

        /// Output image path
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PreviewPage {
    Banner,
    Registers,
    Panel,
    Drives,
    Ports,
    Memory,
}

#[derive(Clone, Copy, ValueEnum)]
enum Depth {
    Rgb444,
    Rgb565,
}

#[derive(Clone, Copy, ValueEnum)]
enum Cpu {
    Z80,
    I8080,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let level = if args.verbose { log::LevelFilter::Debug } else { log::LevelFilter::Warn };
    init_logger(StderrSink, level);

    match args.command {
        Command::Format { output, tracks, sectors } => format_image(&output, tracks, sectors)?,
        Command::Settings { file, init } => settings(&file, init)?,
        Command::Preview {
            page,
            depth,
            cpu,
            output,
        } => preview(page, depth, cpu, &output)?,
    }
    Ok(())
}

fn format_image(output: &Path, tracks: u8, sectors: u8) -> std::io::Result<()> {
    let size = tracks as usize * sectors as usize * SECTOR_SIZE;
    fs::write(output, vec![EMPTY_BYTE; size])?;
    println!(
        "Created disk image {:?} ({} tracks, {} sectors, {} bytes)",
        output, tracks, sectors, size
    );
    Ok(())
}

fn settings(file: &Path, init: bool) -> Result<(), Box<dyn std::error::Error>> {
    if init {
        fs::write(file, MachineSettings::default().encode())?;
        println!("Wrote default settings to {:?}", file);
        return Ok(());
    }

    let data = fs::read(file)?;
    let s = MachineSettings::decode(&data).map_err(|e| e.to_string())?;
    println!("CPU:          {}", s.cpu.name());
    if s.speed == 0 {
        println!("Speed:        unlimited");
    } else {
        println!("Speed:        {} MHz", s.speed);
    }
    println!("Port 255:     {:02X}", s.fp_value);
    println!("Brightness:   {}%", s.brightness);
    println!("Rotated:      {}", if s.rotated { "yes" } else { "no" });
    println!("Initial page: {}", s.initial_page.name());
    for (i, disk) in s.disks.iter().enumerate() {
        println!("Drive {}:      {}", (b'A' + i as u8) as char, disk.as_deref().unwrap_or("-"));
    }
    Ok(())
}

/// Machine state with something to look at on every page.
fn demo_machine(cpu: CpuKind) -> AtomicMachine {
    let m = AtomicMachine::new(cpu, 2);
    let regs = [
        (Reg::A, 0x3e),
        (Reg::F, 0x45),
        (Reg::B, 0x12),
        (Reg::C, 0x34),
        (Reg::D, 0x56),
        (Reg::E, 0x78),
        (Reg::H, 0x9a),
        (Reg::L, 0xbc),
        (Reg::IX, 0x1234),
        (Reg::IY, 0x5678),
        (Reg::SP, 0xef00),
        (Reg::PC, 0x0100),
        (Reg::IFF, 0x03),
        (Reg::R, 0x2a),
    ];
    for (reg, value) in regs {
        m.set_register(reg, value);
    }
    m.set_panel(PanelSource::Address, 0x0100);
    m.set_panel(PanelSource::Data, 0x3e);
    m.set_panel(PanelSource::CpuRun, 1);
    m.set_cpu_freq(4_000_000);

    // some code-like pattern in both banks
    for addr in 0..0xc000u16 {
        m.putmem(addr, (addr.wrapping_mul(31) >> 3) as u8);
    }
    m.select_bank(1);
    for addr in 0..0xc000u16 {
        m.putmem(addr, (addr >> 8) as u8);
    }
    m.select_bank(0);
    m
}

fn preview(page: PreviewPage, depth: Depth, cpu: Cpu, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let cpu = match cpu {
        Cpu::Z80 => CpuKind::Z80,
        Cpu::I8080 => CpuKind::I8080,
    };
    let depth = match depth {
        Depth::Rgb444 => ColorDepth::Rgb444,
        Depth::Rgb565 => ColorDepth::Rgb565,
    };
    let machine = demo_machine(cpu);
    let telemetry = Telemetry::new();
    telemetry.update_drive(0, 2, 5, 0x0080, false, true);
    telemetry.update_drive(1, 40, 26, 0x8000, true, true);
    telemetry.port_in(0x01);
    telemetry.port_out(0xfe);

    let mut lcd = Lcd::new(&telemetry);
    match page {
        PreviewPage::Banner => lcd.show_custom(Some(DrawFn::Banner)),
        PreviewPage::Registers => lcd.show_status(StatusMode::Registers),
        PreviewPage::Panel => lcd.show_status(StatusMode::Panel),
        PreviewPage::Drives => lcd.show_status(StatusMode::Drives),
        PreviewPage::Ports => lcd.show_status(StatusMode::Ports),
        PreviewPage::Memory => lcd.show_status(StatusMode::Memory),
    }

    let config = DisplayConfig {
        depth,
        ..DisplayConfig::default()
    };
    let mut task = DisplayTask::new(config, &telemetry, &machine, HeadlessDisplay::new(), StdClock::new(), || 24.5f32);
    // static part first, live values on the second frame
    task.step();
    task.step();

    let canvas = task.canvas();
    let mut out = BufWriter::new(File::create(output)?);
    write!(out, "P6\n{} {}\n255\n", canvas.width(), canvas.height())?;
    out.write_all(&canvas.to_rgb888())?;
    out.flush()?;
    println!(
        "Rendered {} frames ({}x{}) to {:?}",
        task.device().frames,
        canvas.width(),
        canvas.height(),
        output
    );
    Ok(())
}
