// src/db/store.rs
//
// Storage chave-valor de coleções JSON com exclusão lógica. Cada coleção é
// um array de entidades serializadas; o conjunto inteiro é gravado num
// único arquivo a cada mutação (write-through). Não há processo externo
// nem escritor concorrente: o RwLock garante que cada transição de estado
// seja um read-modify-write atômico sobre a versão corrente do registro.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use anyhow::{anyhow, Context};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::audit::{AuditLog, AUDIT_LOG_CAP};
use crate::models::base::{BaseFields, Entity};

const KEY_CURRENT_USER: &str = "current_user";
const KEY_DATA_VERSION: &str = "data_version";

#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedState {
    collections: HashMap<String, Vec<Value>>,
    scalars: HashMap<String, String>,
}

#[derive(Debug)]
struct StorageInner {
    state: PersistedState,
    // `None` mantém tudo em memória (testes)
    path: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct Storage {
    inner: Arc<RwLock<StorageInner>>,
}

impl Storage {
    /// Abre (ou cria) o arquivo de dados.
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let state = if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("falha ao ler {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("arquivo de dados corrompido: {}", path.display()))?
        } else {
            PersistedState::default()
        };

        Ok(Self {
            inner: Arc::new(RwLock::new(StorageInner {
                state,
                path: Some(path),
            })),
        })
    }

    /// Storage volátil, sem arquivo. Usado nos testes.
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(RwLock::new(StorageInner {
                state: PersistedState::default(),
                path: None,
            })),
        }
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, StorageInner>, AppError> {
        self.inner
            .read()
            .map_err(|_| AppError::from(anyhow!("lock do storage envenenado")))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, StorageInner>, AppError> {
        self.inner
            .write()
            .map_err(|_| AppError::from(anyhow!("lock do storage envenenado")))
    }

    fn persist(inner: &StorageInner) -> Result<(), AppError> {
        if let Some(path) = &inner.path {
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("falha ao criar {}", dir.display()))?;
            }
            let raw = serde_json::to_string_pretty(&inner.state)?;
            std::fs::write(path, raw)
                .with_context(|| format!("falha ao gravar {}", path.display()))?;
        }
        Ok(())
    }

    fn matches_id(value: &Value, id: Uuid) -> bool {
        value
            .get("id")
            .and_then(Value::as_str)
            .is_some_and(|raw| raw == id.to_string())
    }

    fn is_deleted(value: &Value) -> bool {
        value
            .get("deletedAt")
            .is_some_and(|deleted| !deleted.is_null())
    }

    // --- Operações genéricas ---

    /// Todos os registros não excluídos da coleção (ou todos, com
    /// `include_deleted`). Coleção ausente devolve lista vazia, nunca erro.
    pub fn get_all<T: Entity>(&self, include_deleted: bool) -> Result<Vec<T>, AppError> {
        let inner = self.read()?;
        let Some(items) = inner.state.collections.get(T::COLLECTION) else {
            return Ok(Vec::new());
        };
        items
            .iter()
            .filter(|value| include_deleted || !Self::is_deleted(value))
            .map(|value| serde_json::from_value(value.clone()).map_err(AppError::from))
            .collect()
    }

    /// Busca por id. Registros excluídos logicamente não são encontrados.
    pub fn get_by_id<T: Entity>(&self, id: Uuid) -> Result<Option<T>, AppError> {
        let inner = self.read()?;
        let Some(items) = inner.state.collections.get(T::COLLECTION) else {
            return Ok(None);
        };
        items
            .iter()
            .find(|value| Self::matches_id(value, id) && !Self::is_deleted(value))
            .map(|value| serde_json::from_value(value.clone()).map_err(AppError::from))
            .transpose()
    }

    /// Insere uma entidade nova: id e timestamps são atribuídos aqui,
    /// `deletedAt` nasce nulo.
    pub fn create<T: Entity>(&self, mut entity: T) -> Result<T, AppError> {
        *entity.base_mut() = BaseFields::new();
        let value = serde_json::to_value(&entity)?;

        let mut inner = self.write()?;
        inner
            .state
            .collections
            .entry(T::COLLECTION.to_string())
            .or_default()
            .push(value);
        Self::persist(&inner)?;
        Ok(entity)
    }

    /// Merge raso de um patch JSON sobre o registro: campos ausentes no
    /// patch mantêm o valor anterior; `updatedAt` é renovado.
    pub fn update<T: Entity>(&self, id: Uuid, patch: Value) -> Result<Option<T>, AppError> {
        let mut inner = self.write()?;
        let Some(items) = inner.state.collections.get_mut(T::COLLECTION) else {
            return Ok(None);
        };
        let Some(value) = items.iter_mut().find(|value| Self::matches_id(value, id)) else {
            return Ok(None);
        };

        if let (Some(target), Some(fields)) = (value.as_object_mut(), patch.as_object()) {
            for (key, field) in fields {
                target.insert(key.clone(), field.clone());
            }
            target.insert("updatedAt".to_string(), json!(Utc::now()));
        }

        let updated: T = serde_json::from_value(value.clone())?;
        Self::persist(&inner)?;
        Ok(Some(updated))
    }

    /// Read-modify-write tipado sob um único lock de escrita: a transição
    /// valida e muta dentro do fechamento; erro do fechamento aborta sem
    /// gravar nada.
    pub fn update_with<T: Entity>(
        &self,
        id: Uuid,
        mutate: impl FnOnce(&mut T) -> Result<(), AppError>,
    ) -> Result<Option<T>, AppError> {
        let mut inner = self.write()?;
        let Some(items) = inner.state.collections.get_mut(T::COLLECTION) else {
            return Ok(None);
        };
        let Some(value) = items.iter_mut().find(|value| Self::matches_id(value, id)) else {
            return Ok(None);
        };

        let mut entity: T = serde_json::from_value(value.clone())?;
        mutate(&mut entity)?;
        entity.base_mut().updated_at = Utc::now();
        *value = serde_json::to_value(&entity)?;

        Self::persist(&inner)?;
        Ok(Some(entity))
    }

    /// Exclusão lógica. Idempotente: excluir um registro já excluído é
    /// sucesso sem efeito. `false` apenas quando o id nunca existiu.
    pub fn soft_delete<T: Entity>(&self, id: Uuid) -> Result<bool, AppError> {
        let mut inner = self.write()?;
        let Some(items) = inner.state.collections.get_mut(T::COLLECTION) else {
            return Ok(false);
        };
        let Some(value) = items.iter_mut().find(|value| Self::matches_id(value, id)) else {
            return Ok(false);
        };

        if Self::is_deleted(value) {
            return Ok(true);
        }

        if let Some(target) = value.as_object_mut() {
            let now = json!(Utc::now());
            target.insert("deletedAt".to_string(), now.clone());
            target.insert("updatedAt".to_string(), now);
        }
        Self::persist(&inner)?;
        Ok(true)
    }

    /// Remoção física, irreversível. Uso restrito a administradores.
    pub fn hard_delete<T: Entity>(&self, id: Uuid) -> Result<bool, AppError> {
        let mut inner = self.write()?;
        let Some(items) = inner.state.collections.get_mut(T::COLLECTION) else {
            return Ok(false);
        };
        let before = items.len();
        items.retain(|value| !Self::matches_id(value, id));
        let removed = items.len() < before;
        if removed {
            Self::persist(&inner)?;
        }
        Ok(removed)
    }

    // --- Auditoria ---

    /// Registra uma ação na trilha, do mais novo para o mais antigo, com
    /// eviction FIFO além do limite.
    pub fn log_audit(
        &self,
        user_id: Uuid,
        user_name: &str,
        action: &str,
        entity: &str,
        entity_id: Uuid,
        details: Option<Value>,
    ) -> Result<(), AppError> {
        let log = AuditLog {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            user_id,
            user_name: user_name.to_string(),
            action: action.to_string(),
            entity: entity.to_string(),
            entity_id,
            details,
            ip_address: None,
        };
        let value = serde_json::to_value(&log)?;

        let mut inner = self.write()?;
        let logs = inner
            .state
            .collections
            .entry("audit_logs".to_string())
            .or_default();
        logs.insert(0, value);
        logs.truncate(AUDIT_LOG_CAP);
        Self::persist(&inner)?;
        Ok(())
    }

    pub fn audit_logs(&self) -> Result<Vec<AuditLog>, AppError> {
        let inner = self.read()?;
        let Some(items) = inner.state.collections.get("audit_logs") else {
            return Ok(Vec::new());
        };
        items
            .iter()
            .map(|value| serde_json::from_value(value.clone()).map_err(AppError::from))
            .collect()
    }

    // --- Sessão e versão de dados ---

    pub fn set_current_user(&self, user_id: Uuid) -> Result<(), AppError> {
        let mut inner = self.write()?;
        inner
            .state
            .scalars
            .insert(KEY_CURRENT_USER.to_string(), user_id.to_string());
        Self::persist(&inner)
    }

    pub fn current_user_id(&self) -> Result<Option<Uuid>, AppError> {
        let inner = self.read()?;
        Ok(inner
            .state
            .scalars
            .get(KEY_CURRENT_USER)
            .and_then(|raw| Uuid::parse_str(raw).ok()))
    }

    pub fn clear_session(&self) -> Result<(), AppError> {
        let mut inner = self.write()?;
        inner.state.scalars.remove(KEY_CURRENT_USER);
        Self::persist(&inner)
    }

    pub fn data_version(&self) -> Result<Option<String>, AppError> {
        let inner = self.read()?;
        Ok(inner.state.scalars.get(KEY_DATA_VERSION).cloned())
    }

    pub fn set_data_version(&self, version: &str) -> Result<(), AppError> {
        let mut inner = self.write()?;
        inner
            .state
            .scalars
            .insert(KEY_DATA_VERSION.to_string(), version.to_string());
        Self::persist(&inner)
    }

    /// Apaga todo o estado persistido. Só é chamado pelo reseed disparado
    /// por troca de versão de dados.
    pub fn wipe(&self) -> Result<(), AppError> {
        let mut inner = self.write()?;
        inner.state.collections.clear();
        inner.state.scalars.clear();
        Self::persist(&inner)
    }

    pub fn is_collection_empty(&self, collection: &str) -> Result<bool, AppError> {
        let inner = self.read()?;
        Ok(inner
            .state
            .collections
            .get(collection)
            .is_none_or(|items| items.is_empty()))
    }

    /// Insere preservando o `BaseFields` já montado. Exclusivo do seed,
    /// que precisa de ids estáveis entre entidades relacionadas.
    pub(crate) fn seed_insert<T: Entity>(&self, entity: &T) -> Result<(), AppError> {
        let value = serde_json::to_value(entity)?;
        let mut inner = self.write()?;
        inner
            .state
            .collections
            .entry(T::COLLECTION.to_string())
            .or_default()
            .push(value);
        Self::persist(&inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notifications::{Notification, NotificationType};

    fn nota(user_id: Uuid) -> Notification {
        Notification::new(user_id, NotificationType::Info, "Título", "Mensagem")
    }

    #[test]
    fn soft_delete_some_da_listagem_padrao_mas_nao_da_completa() {
        let storage = Storage::in_memory();
        let user_id = Uuid::new_v4();
        let criada = storage.create(nota(user_id)).unwrap();
        let outra = storage.create(nota(user_id)).unwrap();

        assert!(storage.soft_delete::<Notification>(criada.id()).unwrap());

        let visiveis = storage.get_all::<Notification>(false).unwrap();
        assert_eq!(visiveis.len(), 1);
        assert_eq!(visiveis[0].id(), outra.id());

        let todas = storage.get_all::<Notification>(true).unwrap();
        assert_eq!(todas.len(), 2);

        // por id também não aparece
        assert!(storage.get_by_id::<Notification>(criada.id()).unwrap().is_none());
    }

    #[test]
    fn soft_delete_e_idempotente_e_distingue_id_inexistente() {
        let storage = Storage::in_memory();
        let criada = storage.create(nota(Uuid::new_v4())).unwrap();

        assert!(storage.soft_delete::<Notification>(criada.id()).unwrap());
        // repetir é no-op com sucesso
        assert!(storage.soft_delete::<Notification>(criada.id()).unwrap());
        // id que nunca existiu
        assert!(!storage.soft_delete::<Notification>(Uuid::new_v4()).unwrap());
    }

    #[test]
    fn update_faz_merge_parcial_e_renova_updated_at() {
        let storage = Storage::in_memory();
        let criada = storage.create(nota(Uuid::new_v4())).unwrap();

        let atualizada: Notification = storage
            .update(criada.id(), json!({ "read": true }))
            .unwrap()
            .expect("registro existe");

        assert!(atualizada.read);
        // campos fora do patch permanecem
        assert_eq!(atualizada.title, "Título");
        assert!(atualizada.base.updated_at >= criada.base.updated_at);
    }

    #[test]
    fn update_de_id_ausente_devolve_none() {
        let storage = Storage::in_memory();
        let resultado: Option<Notification> =
            storage.update(Uuid::new_v4(), json!({ "read": true })).unwrap();
        assert!(resultado.is_none());
    }

    #[test]
    fn colecao_ausente_lista_vazia_sem_erro() {
        let storage = Storage::in_memory();
        assert!(storage.get_all::<Notification>(false).unwrap().is_empty());
        assert!(storage.get_by_id::<Notification>(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn hard_delete_remove_fisicamente() {
        let storage = Storage::in_memory();
        let criada = storage.create(nota(Uuid::new_v4())).unwrap();

        assert!(storage.hard_delete::<Notification>(criada.id()).unwrap());
        assert!(storage.get_all::<Notification>(true).unwrap().is_empty());
        assert!(!storage.hard_delete::<Notification>(criada.id()).unwrap());
    }

    #[test]
    fn trilha_de_auditoria_respeita_o_limite_com_eviction_fifo() {
        let storage = Storage::in_memory();
        let actor = Uuid::new_v4();

        for i in 0..(AUDIT_LOG_CAP + 1) {
            storage
                .log_audit(actor, "Admin", &format!("ACAO_{i}"), "Teste", Uuid::new_v4(), None)
                .unwrap();
        }

        let logs = storage.audit_logs().unwrap();
        assert_eq!(logs.len(), AUDIT_LOG_CAP);
        // mais novo primeiro; o registro 0 (mais antigo) foi evitado
        assert_eq!(logs[0].action, format!("ACAO_{}", AUDIT_LOG_CAP));
        assert_eq!(logs[AUDIT_LOG_CAP - 1].action, "ACAO_1");
    }

    #[test]
    fn sessao_e_escalares() {
        let storage = Storage::in_memory();
        assert!(storage.current_user_id().unwrap().is_none());

        let user_id = Uuid::new_v4();
        storage.set_current_user(user_id).unwrap();
        assert_eq!(storage.current_user_id().unwrap(), Some(user_id));

        storage.clear_session().unwrap();
        assert!(storage.current_user_id().unwrap().is_none());
    }
}
