use std::error::Error;

use semihost::sim::{SimTarget, RAM_BASE};
use semihost::target::{reg, Target};
use semihost::SemihostAgent;

// Smoke harness: park a simulated core on the trap instruction and service
// a console write followed by a pixel batch request.
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let asset_path = std::env::temp_dir().join("semihost-demo.dat");
    std::fs::write(&asset_path, demo_asset())?;
    let agent = SemihostAgent::new(&asset_path);

    let mut target = SimTarget::new(0x1000);
    target.load(RAM_BASE, &0xBEABu16.to_le_bytes())?;
    target.regs[reg::PC as usize] = RAM_BASE;

    target.regs[reg::R0 as usize] = 0x04;
    target.regs[reg::R1 as usize] = RAM_BASE + 0x100;
    target.load(RAM_BASE + 0x100, b"hello from the target\n\0")?;
    agent.on_halt(&mut target)?;

    target.regs[reg::R0 as usize] = 0xFF;
    target.regs[reg::R1 as usize] = RAM_BASE + 0x200;
    target.load(RAM_BASE + 0x200, &[2, 0, 10, 0])?;
    agent.on_halt(&mut target)?;

    let mut delivered = [0u8; 20];
    target.read_memory(RAM_BASE + 0x200, &mut delivered)?;
    log::info!("delivered batch 2: {delivered:02x?}");
    log::info!("core resumed {} times", target.resume_count());

    std::fs::remove_file(&asset_path).ok();
    Ok(())
}

/// 80 packed pixels of a green ramp, enough for 8 batches of 10.
fn demo_asset() -> Vec<u8> {
    let mut bytes = Vec::with_capacity(160);
    for i in 0..80u16 {
        bytes.extend_from_slice(&(i << 5).to_le_bytes());
    }
    bytes
}
