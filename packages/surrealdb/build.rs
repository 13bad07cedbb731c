use std::env;
use std::fs;
use std::path::Path;

// Concatenates migrations/tables/*.surql, in file name order, into a single
// script that `migrations::apply` embeds.
fn main() {
    println!("cargo:rerun-if-changed=migrations/tables");

    let out_dir = match env::var("OUT_DIR") {
        Ok(dir) => dir,
        Err(e) => panic!("BUILD FAILED: cannot read OUT_DIR: {}", e),
    };
    let dest_path = Path::new(&out_dir).join("migrations.surql");

    let mut entries: Vec<_> = match fs::read_dir("migrations/tables") {
        Ok(dir) => dir.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
        Err(e) => panic!("BUILD FAILED: cannot read migrations/tables: {}", e),
    };
    entries.retain(|path| path.extension().and_then(|s| s.to_str()) == Some("surql"));
    entries.sort();

    let mut combined = String::new();
    for path in entries {
        println!("cargo:rerun-if-changed={}", path.display());
        match fs::read_to_string(&path) {
            Ok(content) => combined.push_str(&content),
            Err(e) => panic!("BUILD FAILED: cannot read migration {:?}: {}", path, e),
        }
        combined.push_str("\n\n");
    }

    if let Err(e) = fs::write(&dest_path, combined) {
        panic!("BUILD FAILED: cannot write {:?}: {}", dest_path, e);
    }
}
