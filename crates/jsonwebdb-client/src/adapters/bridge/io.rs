use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use jsonwebdb_client::error::JwdbResult;

/// Line oriented JSON over any async reader/writer pair.
pub struct NdjsonIo<R, W> {
    reader: R,
    writer: W,
    line: String,
}

impl<R, W> NdjsonIo<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            line: String::new(),
        }
    }

    /// `None` at end of input; blank lines come back as empty strings.
    pub async fn read_line(&mut self) -> JwdbResult<Option<String>> {
        self.line.clear();
        let n = self.reader.read_line(&mut self.line).await?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(self.line.trim().to_string()))
    }

    pub async fn write_json_line<T: serde::Serialize>(&mut self, v: &T) -> JwdbResult<()> {
        let mut buf = serde_json::to_vec(v)?;
        buf.push(b'\n');
        self.writer.write_all(&buf).await?;
        self.writer.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_lines_and_writes_json() {
        let input: &[u8] = b"{\"a\":1}\n\n  \n";
        let mut out = Vec::new();
        {
            let mut io = NdjsonIo::new(input, &mut out);
            assert_eq!(io.read_line().await.unwrap().as_deref(), Some("{\"a\":1}"));
            assert_eq!(io.read_line().await.unwrap().as_deref(), Some(""));
            assert_eq!(io.read_line().await.unwrap().as_deref(), Some(""));
            assert!(io.read_line().await.unwrap().is_none());
            io.write_json_line(&serde_json::json!({ "ok": true })).await.unwrap();
        }
        assert_eq!(out, b"{\"ok\":true}\n");
    }
}
