//! Interactive command shell over a [`Database`].

use std::fs::File;
use std::io::{BufRead, BufReader, Write};

use crate::common::Result;
use crate::record::{Database, StudentRecord};

const COMMANDS: &str = "Commands: add, show, update, load, merge, quit";

/// Line-oriented shell reading commands from `input` and writing prompts
/// and results to `output`.
///
/// Bad user input (an unknown command, a non-numeric id, a missing load
/// file) is reported and the loop continues. Errors from the database
/// itself end the session.
pub struct Shell<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Run until `quit` or end of input, then close `db`.
    pub fn run(mut self, mut db: Database) -> Result<()> {
        loop {
            writeln!(self.output, "{}", COMMANDS)?;
            let Some(command) = self.prompt("Enter command: ")? else {
                break;
            };

            match command.as_str() {
                "quit" => break,
                "add" => {
                    if let Some(record) = self.read_record()? {
                        db.add_record(&record)?;
                        writeln!(self.output, "Record added.")?;
                    }
                }
                "update" => {
                    if let Some(record) = self.read_record()? {
                        db.stage_update(&record)?;
                        writeln!(self.output, "Update staged; run merge to apply.")?;
                    }
                }
                "show" => {
                    if let Some(id) = self.read_id("Enter ID to show: ")? {
                        match db.find_record(id)? {
                            Some(record) => writeln!(self.output, "{}", record)?,
                            None => writeln!(self.output, "No record found with ID: {}", id)?,
                        }
                    }
                }
                "load" => {
                    let Some(name) = self.prompt("Enter filename to load from: ")? else {
                        break;
                    };
                    match File::open(&name) {
                        Ok(file) => {
                            let report = db.load_records(BufReader::new(file))?;
                            writeln!(
                                self.output,
                                "Loaded {} records ({} skipped).",
                                report.loaded, report.skipped
                            )?;
                        }
                        Err(err) => writeln!(self.output, "Cannot open {}: {}", name, err)?,
                    }
                }
                "merge" => {
                    let kept = db.merge_records()?;
                    writeln!(self.output, "Merge completed ({} records).", kept)?;
                }
                "" => {}
                _ => writeln!(self.output, "Unknown command.")?,
            }
        }

        db.close()
    }

    /// Print `message` and read one trimmed line. `None` at end of input.
    fn prompt(&mut self, message: &str) -> Result<Option<String>> {
        write!(self.output, "{}", message)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn read_id(&mut self, message: &str) -> Result<Option<i64>> {
        let Some(text) = self.prompt(message)? else {
            return Ok(None);
        };
        match text.parse::<i64>() {
            Ok(id) => Ok(Some(id)),
            Err(_) => {
                writeln!(self.output, "Invalid ID: {}", text)?;
                Ok(None)
            }
        }
    }

    fn read_record(&mut self) -> Result<Option<StudentRecord>> {
        let Some(id) = self.read_id("Enter ID: ")? else {
            return Ok(None);
        };
        let mut fields = Vec::with_capacity(3);
        for message in ["Enter Last Name: ", "Enter First Name: ", "Enter Letter Grade: "] {
            match self.prompt(message)? {
                Some(field) => fields.push(field),
                None => return Ok(None),
            }
        }
        Ok(Some(StudentRecord::new(id, &fields[0], &fields[1], &fields[2])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn run_script(base: &std::path::Path, script: &str) -> String {
        let db = Database::open(base).unwrap();
        let mut output = Vec::new();
        Shell::new(script.as_bytes(), &mut output).run(db).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_add_and_show() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("school");

        let out = run_script(&base, "add\n5\nFranklin\nRosalind\nA\nshow\n5\nshow\n6\nquit\n");

        assert!(out.contains("Record added."));
        assert!(out.contains("ID: 5, Last Name: Franklin, First Name: Rosalind, Grade: A"));
        assert!(out.contains("No record found with ID: 6"));
    }

    #[test]
    fn test_bad_input_keeps_running() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("school");

        let out = run_script(&base, "frobnicate\nshow\nabc\nload\nmissing.csv\nquit\n");

        assert!(out.contains("Unknown command."));
        assert!(out.contains("Invalid ID: abc"));
        assert!(out.contains("Cannot open missing.csv"));
    }

    #[test]
    fn test_load_with_bad_line_keeps_session() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("school");
        let csv = dir.path().join("students.csv");
        std::fs::write(&csv, b"1,Ada,Lovelace,A\n2,\xff,Bad,B\n3,Babbage,Charles,C\n").unwrap();

        let script = format!("load\n{}\nshow\n3\nquit\n", csv.display());
        let out = run_script(&base, &script);

        assert!(out.contains("Loaded 2 records (1 skipped)."));
        assert!(out.contains("ID: 3, Last Name: Babbage"));
    }

    #[test]
    fn test_update_then_merge() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("school");

        let out = run_script(
            &base,
            "add\n1\nMeitner\nLise\nB\nupdate\n1\nMeitner\nLise\nA\nshow\n1\nmerge\nshow\n1\n",
        );

        assert!(out.contains("Update staged"));
        let before = out.find("Grade: B").unwrap();
        let after = out.rfind("Grade: A").unwrap();
        assert!(before < after);
        assert!(out.contains("Merge completed (1 records)."));
    }

    #[test]
    fn test_session_persists() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("school");

        run_script(&base, "add\n9\nShannon\nClaude\nA\nquit\n");
        let out = run_script(&base, "show\n9\nquit\n");

        assert!(out.contains("Last Name: Shannon"));
    }
}
