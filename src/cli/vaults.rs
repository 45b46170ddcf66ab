//! The `vaults` command

use crate::config::Settings;
use crate::error::ExportResult;
use crate::import::{OpCli, OpRunner, OpSource};

/// Vault names in listing order
pub fn vault_names<R: OpRunner>(source: &OpSource<R>) -> ExportResult<Vec<String>> {
    Ok(source.list_vaults()?.into_iter().map(|v| v.name).collect())
}

/// Handle `vault-pdf vaults`
pub fn handle_vaults_command(settings: &Settings) -> ExportResult<()> {
    let source = OpSource::new(OpCli::new(settings.op_binary.clone()));
    let names = vault_names(&source)?;

    if names.is_empty() {
        eprintln!("No vaults found.");
        return Ok(());
    }
    for name in names {
        println!("{}", name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExportError;

    struct Canned(&'static str);

    impl OpRunner for Canned {
        fn run_json(&self, args: &[&str]) -> ExportResult<Vec<u8>> {
            assert_eq!(args, ["vault", "list"]);
            Ok(self.0.as_bytes().to_vec())
        }
    }

    #[test]
    fn test_vault_names() {
        let source = OpSource::new(Canned(r#"[{"id":"a","name":"Personal"},{"id":"b","name":"Work"}]"#));
        assert_eq!(vault_names(&source).unwrap(), vec!["Personal", "Work"]);
    }

    #[test]
    fn test_malformed_vault_list() {
        let source = OpSource::new(Canned("oops"));
        assert!(matches!(
            vault_names(&source),
            Err(ExportError::SourceUnavailable(_))
        ));
    }
}
