use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("limero {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: limero");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("target: {}", env!("LIMERO_BUILD_TARGET"));
    println!("profile: {}", env!("LIMERO_BUILD_PROFILE"));
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!(
        "features: serde={}, cli=true",
        cfg!(feature = "serde")
    );
    println!(
        "limits: max_frame_size={}, encoder_capacity={}, value_depth={}",
        limero_frame::DEFAULT_MAX_FRAME_SIZE,
        limero_frame::DEFAULT_CAPACITY,
        limero_value::MAX_DEPTH
    );

    Ok(SUCCESS)
}
