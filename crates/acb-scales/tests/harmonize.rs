use std::fs;

use acb_scales::{COMBINED_FILE, ScaleName, harmonize, write_combined};
use tempfile::TempDir;

fn write_scales(dir: &TempDir) {
    for name in ScaleName::ALL {
        let body = match name {
            ScaleName::Ancelin => "drug,aa\nElavil ,3\namitriptyline,2\ncodeine,1\n",
            ScaleName::Ehrt => "Drug,Score\namitriptyline,4\n",
            ScaleName::Duran => "drug,aa\nketotifen,1\nparoxetine,2\n",
            ScaleName::Kiesel => "drug,aa\nrotigotine,1\n",
            _ => "drug,aa\n",
        };
        fs::write(dir.path().join(name.file_name()), body).unwrap();
    }
    fs::write(
        dir.path().join("names.csv"),
        b"brand,generic,combination\nELAVIL,amitriptyline,b\n",
    )
    .unwrap();
}

#[test]
fn harmonizes_and_writes_combined_table() {
    let dir = TempDir::new().unwrap();
    write_scales(&dir);
    let rows = harmonize(dir.path(), &dir.path().join("names.csv")).unwrap();

    let drugs: Vec<&str> = rows.iter().map(|r| r.drug.as_str()).collect();
    assert_eq!(
        drugs,
        vec!["amitriptyline", "codeine", "ketotifen", "paroxetine", "rotigotine"]
    );

    // "Elavil" became amitriptyline, so Ancelin keeps its higher score (3);
    // Ehrt's 4 is rescaled to 3.
    let ami = &rows[0];
    assert_eq!(ami.core[0], 3.0);
    assert_eq!(ami.counts[4], 2);
    assert_eq!(ami.meta, 3.0);

    let paroxetine = &rows[3];
    assert_eq!(paroxetine.duran, 3.0);
    assert_eq!(paroxetine.counts.iter().sum::<u32>(), 0);

    let out = dir.path().join(COMBINED_FILE);
    let written = write_combined(&rows, &out).unwrap();
    assert_eq!(written.rows, 5);
    let text = fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("drug,aa_ancelin,aa_chew,"));
    assert!(text.lines().next().unwrap().ends_with("aa_meta,aa_kiesel,aa_duran"));
}

#[test]
fn missing_scale_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    write_scales(&dir);
    fs::remove_file(dir.path().join("Han.csv")).unwrap();
    assert!(harmonize(dir.path(), &dir.path().join("names.csv")).is_err());
}
