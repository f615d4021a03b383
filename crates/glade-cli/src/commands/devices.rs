//! Output device listing command.

use clap::Args;
use glade_io::list_devices;

#[derive(Args)]
pub struct DevicesArgs {}

pub fn run(_args: DevicesArgs) -> anyhow::Result<()> {
    let devices = list_devices()?;

    if devices.is_empty() {
        println!("No output devices found.");
        return Ok(());
    }

    println!("Output Devices");
    println!("==============\n");
    for (idx, device) in devices.iter().enumerate() {
        let marker = if device.is_default { " (default)" } else { "" };
        println!(
            "  [{}] {} ({} Hz, {} ch){}",
            idx, device.name, device.default_sample_rate, device.channels, marker
        );
    }
    println!();
    println!("Tip: Use device index or partial name with --output:");
    println!("  glade play world.toml --output 0");
    println!("  glade play world.toml --output \"USB\"");
    Ok(())
}
