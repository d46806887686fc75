// An `InferenceModel` backed by an external program.
//
// The program receives the encoded tensor as raw native-endian f32 bytes on stdin and
// must print the confidence vector the same way on stdout, then exit 0. This lets
// the tester drive whatever runtime the model was exported for without linking it.

use fruit_vision::core_modules::decoder::confidences_from_ne_bytes;
use fruit_vision::pipeline::EncodedTensor;
use fruit_vision::{ClassifierError, InferenceModel, Result};
use log::debug;
use std::io::Write;
use std::process::{Command, Stdio};

pub struct CommandModel {
    program: String,
    args: Vec<String>,
}

impl CommandModel {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl InferenceModel for CommandModel {
    fn process(&mut self, input: &EncodedTensor) -> Result<Vec<f32>> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| ClassifierError::Inference(format!("failed to start {}: {}", self.program, e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ClassifierError::Inference("model stdin unavailable".to_string()))?;
        let bytes = input.to_ne_bytes();
        // Feed stdin from a separate thread so a model that starts writing early cannot deadlock us.
        let writer = std::thread::spawn(move || {
            if let Err(e) = stdin.write_all(&bytes) {
                debug!("model closed stdin early: {}", e);
            }
        });

        let output = child.wait_with_output()?;
        let _ = writer.join();

        if !output.status.success() {
            return Err(ClassifierError::Inference(format!(
                "{} exited with {}",
                self.program, output.status
            )));
        }

        let confidences = confidences_from_ne_bytes(&output.stdout)?;
        debug!("{} returned {} confidences", self.program, confidences.len());
        Ok(confidences)
    }
}
