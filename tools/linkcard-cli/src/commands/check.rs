//! Check capture devices and storage.

use linkcard_capture_engine::CaptureMode;

use super::AppContext;

pub async fn run(ctx: &AppContext) -> anyhow::Result<()> {
    println!("LinkCard System Check");
    println!("{}", "=".repeat(50));

    let devices = ctx.devices();
    println!("[OK] Device backend: {}", devices.name());

    let mut session = ctx.session();
    let mut all_ok = true;
    for mode in [CaptureMode::Photo, CaptureMode::Audio, CaptureMode::Video] {
        match session.start(mode).await {
            Ok(()) => println!("[OK] {mode} device available"),
            Err(e) => {
                all_ok = false;
                println!("[FAIL] {mode} device: {e}");
            }
        }
        session.reset();
    }

    println!();
    let data_dir = &ctx.config.data_dir;
    match std::fs::create_dir_all(data_dir) {
        Ok(()) => println!("[OK] Data directory: {}", data_dir.display()),
        Err(e) => {
            all_ok = false;
            println!("[FAIL] Data directory {}: {e}", data_dir.display());
        }
    }

    let store = ctx.store();
    match store.try_load() {
        Ok(Some(_)) => println!("[OK] Defaults template: {}", store.template_path().display()),
        Ok(None) => println!("[OK] Defaults template: not saved yet (seed values in use)"),
        Err(e) => println!("[WARN] Defaults template unreadable, seed values in use: {e}"),
    }

    match ctx.creator() {
        Some(creator) => println!("[OK] Creator: {creator}"),
        None => println!("[WARN] No creator id configured; pass --user to manage your library"),
    }

    println!();
    if all_ok {
        println!("All capture modes are available. LinkCard is ready.");
    } else {
        println!("Some capture modes are unavailable. See above for details.");
    }
    Ok(())
}
