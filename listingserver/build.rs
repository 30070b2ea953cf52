use std::env;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);

    // Source a protoc binary if one isn't already available on the system.
    if env::var("PROTOC").is_err() {
        if let Ok(protoc) = protoc_bin_vendored::protoc_bin_path() {
            env::set_var("PROTOC", protoc);
        }
    }

    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .out_dir(&out_dir)
        .compile(&["proto/listings.proto"], &["proto"])?;

    println!("cargo:rerun-if-changed=proto/listings.proto");

    Ok(())
}
