use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread::sleep;
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use hotwatch::notify::Event;
use hotwatch::{
    blocking::{Flow, Hotwatch},
    EventKind,
};
use miette::{bail, IntoDiagnostic, Result};

use otto::{Flags, Memory, Pair, Processor, Word};

/// Otto assembles and simulates Intel 8080 programs.
#[derive(Parser)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Shortcut: a bare `.asm` path is run directly
    path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Assemble if needed, then simulate until the program halts
    Run {
        /// `.asm` or `.bin` file to run
        name: PathBuf,
        /// Stop after this many instructions without a halt
        #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
        limit: u64,
    },
    /// Assemble into a raw `.bin` image to run later or inspect
    Assemble {
        /// `.asm` file to assemble
        name: PathBuf,
        /// Destination of the emitted image
        dest: Option<PathBuf>,
    },
    /// Assemble without running or writing any output
    Check {
        /// File to check
        name: PathBuf,
    },
    /// Watch a `.asm` file and re-check it on every change
    Watch {
        /// `.asm` file to watch
        name: PathBuf,
    },
}

/// Instructions to execute before assuming the program will never halt.
const DEFAULT_LIMIT: u64 = 10_000_000;

fn main() -> miette::Result<()> {
    use MsgColor::*;
    let args = Args::parse();
    env_logger::init();

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new() //
                .context_lines(otto::DIAGNOSTIC_CONTEXT_LINES)
                .build(),
        )
    }))?;

    if let Some(command) = args.command {
        match command {
            Command::Run { name, limit } => run(&name, limit),
            Command::Assemble { name, dest } => {
                file_message(Green, "Assembling", &name);
                let contents = fs::read_to_string(&name).into_diagnostic()?;
                let image = otto::assemble(&contents)?;

                let out_file_name = dest.unwrap_or_else(|| name.with_extension("bin"));
                let mut file = File::create(&out_file_name).into_diagnostic()?;
                file.write_all(&image).into_diagnostic()?;

                message(Green, "Finished", &format!("emitted {} bytes", image.len()));
                file_message(Green, "Saved", &out_file_name);
                Ok(())
            }
            Command::Check { name } => {
                file_message(Green, "Checking", &name);
                let contents = fs::read_to_string(&name).into_diagnostic()?;
                let _ = otto::assemble(&contents)?;
                message(Green, "Success", "no errors found!");
                Ok(())
            }
            Command::Watch { name } => {
                if !name.exists() {
                    bail!("File does not exist. Exiting...")
                }
                // Watch the parent directory; editors that save by replace
                // drop the watch on the file itself.
                let folder_path = match name.parent() {
                    Some(pth) if pth.is_dir() => pth.to_path_buf(),
                    _ => Path::new(".").to_path_buf(),
                };

                // Clear screen, cursor to top left
                print!("\x1B[2J\x1B[2;1H");
                file_message(Green, "Watching", &name);
                message(Cyan, "Help", "press CTRL+C to exit");

                let mut watcher = Hotwatch::new_with_custom_delay(Duration::from_millis(500))
                    .into_diagnostic()?;

                watcher
                    .watch(folder_path, move |event: Event| match event.kind {
                        // Save-by-replace shows up as a remove event
                        EventKind::Modify(_) | EventKind::Remove(_) => {
                            print!("\x1B[2J\x1B[2;1H");
                            file_message(Green, "Watching", &name);
                            message(Green, "Re-checking", "file change detected");
                            message(Cyan, "Help", "press CTRL+C to exit");

                            // Short pause so reruns visibly flicker
                            sleep(Duration::from_millis(50));

                            let contents = match fs::read_to_string(&name) {
                                Ok(cts) => cts,
                                Err(e) => {
                                    eprintln!("{e}. Exiting...");
                                    std::process::exit(1)
                                }
                            };
                            match otto::assemble(&contents) {
                                Ok(image) => {
                                    message(
                                        Green,
                                        "Success",
                                        &format!("assembled {} bytes", image.len()),
                                    );
                                }
                                Err(e) => {
                                    message(Red, "Failed", "assembly errors follow");
                                    println!("\n{e:?}");
                                }
                            }
                            Flow::Continue
                        }
                        _ => Flow::Continue,
                    })
                    .into_diagnostic()?;
                watcher.run();
                Ok(())
            }
        }
    } else if let Some(path) = args.path {
        run(&path, DEFAULT_LIMIT)
    } else {
        println!("\n~ otto v{VERSION} ~");
        println!("{}", LOGO.truecolor(134, 208, 203).bold());
        println!("{SHORT_INFO}");
        std::process::exit(0);
    }
}

enum MsgColor {
    Green,
    Cyan,
    Red,
}

fn file_message(color: MsgColor, left: &str, right: &PathBuf) {
    let right = format!("target {}", right.display());
    message(color, left, &right);
}

fn message<S>(color: MsgColor, left: S, right: S)
where
    S: Colorize + std::fmt::Display,
{
    let left = match color {
        MsgColor::Green => left.green(),
        MsgColor::Cyan => left.cyan(),
        MsgColor::Red => left.red(),
    };
    println!("{left:>12} {right}");
}

fn run(name: &PathBuf, limit: u64) -> Result<()> {
    use MsgColor::*;
    let image = if let Some(ext) = name.extension() {
        match ext.to_str() {
            Some("bin") => {
                let image = fs::read(name).into_diagnostic()?;
                if image.len() > otto::MEMORY_SIZE {
                    bail!("Binary image does not fit in the 64KB address space")
                }
                image
            }
            Some("asm") => {
                file_message(Green, "Assembling", name);
                let contents = fs::read_to_string(name).into_diagnostic()?;
                otto::assemble(&contents)?
            }
            _ => {
                bail!("File has unknown extension. Exiting...")
            }
        }
    } else {
        bail!("File has no extension. Exiting...");
    };

    let mut mem = Memory::new();
    mem.load(Word::ZERO, &image);
    let mut cpu = Processor::new(mem);

    message(Green, "Running", "emitted image");
    if !cpu.run_bounded(limit) {
        bail!(
            help = "pass --limit to raise the ceiling for long-running programs",
            "Program executed {limit} instructions without halting"
        );
    }

    message(
        Green,
        "Halted",
        &format!("after {} instructions", cpu.steps()),
    );
    if let Some(opcode) = cpu.last_unsupported() {
        message(
            Cyan,
            "Note",
            &format!(
                "{} unsupported opcode(s) ignored, last was {opcode:02X}",
                cpu.unsupported()
            ),
        );
    }
    print_registers(&cpu);

    file_message(Green, "Completed", name);
    Ok(())
}

fn print_registers(cpu: &Processor) {
    let regs = cpu.regs();
    println!();
    println!(
        "        A  {:02X}    BC {}    DE {}",
        regs.a,
        regs.pair(Pair::Bc),
        regs.pair(Pair::De),
    );
    println!(
        "        F  {:02X}    HL {}    SP {}",
        regs.flags.to_byte(),
        regs.pair(Pair::Hl),
        regs.sp,
    );
    println!("        PC {}  flags {}", regs.pc, flag_string(&regs.flags));
    println!();
}

fn flag_string(flags: &Flags) -> String {
    format!(
        "{}{}{}{}{}",
        if flags.sign { 'S' } else { '-' },
        if flags.zero { 'Z' } else { '-' },
        if flags.aux { 'A' } else { '-' },
        if flags.parity { 'P' } else { '-' },
        if flags.carry { 'C' } else { '-' },
    )
}

const LOGO: &str = r#"
           dP     dP
 .d8888b.d8888P d8888P .d8888b.
 88'  `88  88     88   88'  `88
 88.  .88  88     88   88.  .88
 `88888P'  dP     dP   `88888P'"#;

const SHORT_INFO: &str = r"
Welcome to otto, an assembler & instruction-set simulator for the Intel 8080.
Run with `-h` or `--help` for usage and the list of subcommands.
";

const VERSION: &str = env!("CARGO_PKG_VERSION");
