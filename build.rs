use std::process::Command;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("[build.rs] INFO: Attempting to get git hash.");
    let git_hash_output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output();

    let git_hash = match git_hash_output {
        Ok(output) => {
            if output.status.success() {
                String::from_utf8(output.stdout)?
                    .trim()
                    .to_string()
            } else {
                let stderr = String::from_utf8_lossy(&output.stderr);
                eprintln!(
                    "[build.rs] WARNING: Git command failed with status {}. Stderr: '{}'. Defaulting git_hash.",
                    output.status, stderr.trim()
                );
                "unknown_git_hash".to_string()
            }
        }
        Err(e) => {
            eprintln!("[build.rs] WARNING: Failed to execute git command: {}. Defaulting git_hash.", e);
            "unknown_git_hash".to_string()
        }
    };
    println!("cargo:rustc-env=GIT_HASH={}", git_hash);
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/");
    println!("cargo:rerun-if-changed=build.rs");
    Ok(())
}
