use async_trait::async_trait;

use crate::constants::INSTANCE_CONFIG_TREE;
use crate::constants::INSTANCE_TREE;
use crate::storage::assemble_instance_config_key;
use crate::storage::assemble_instance_key;
use crate::Instance;
use crate::InstanceConfigRecord;
use crate::InstanceStore;
use crate::Result;
use crate::StorageError;

/// Instance identities and delivery records on two sled trees, keyed by
/// their unique tuples. Uniqueness races surface as `ConstraintViolation`
/// through compare-and-swap against an absent key.
pub struct SledInstanceStore {
    db: sled::Db,
    instances: sled::Tree,
    instance_configs: sled::Tree,
}

impl SledInstanceStore {
    pub fn new(db: sled::Db) -> Result<Self> {
        let instances = db.open_tree(INSTANCE_TREE)?;
        let instance_configs = db.open_tree(INSTANCE_CONFIG_TREE)?;
        Ok(Self {
            db,
            instances,
            instance_configs,
        })
    }
}

#[async_trait]
impl InstanceStore for SledInstanceStore {
    async fn find_instance(
        &self,
        app_id: &str,
        cluster_name: &str,
        data_center: &str,
        ip: &str,
    ) -> Result<Option<Instance>> {
        let key = assemble_instance_key(app_id, cluster_name, ip, data_center);
        match self.instances.get(key.as_bytes())? {
            Some(value) => Ok(Some(bincode::deserialize(&value)?)),
            None => Ok(None),
        }
    }

    async fn create_instance(
        &self,
        app_id: &str,
        cluster_name: &str,
        data_center: &str,
        ip: &str,
    ) -> Result<Instance> {
        let key = assemble_instance_key(app_id, cluster_name, ip, data_center);
        let instance = Instance {
            id: self.db.generate_id()? + 1,
            app_id: app_id.to_string(),
            cluster_name: cluster_name.to_string(),
            data_center: data_center.to_string(),
            ip: ip.to_string(),
        };
        let bytes = bincode::serialize(&instance)?;

        match self
            .instances
            .compare_and_swap(key.as_bytes(), None as Option<&[u8]>, Some(bytes))?
        {
            Ok(()) => Ok(instance),
            Err(_) => Err(StorageError::ConstraintViolation { key }.into()),
        }
    }

    async fn find_instance_config(
        &self,
        instance_id: u64,
        config_app_id: &str,
        config_namespace: &str,
    ) -> Result<Option<InstanceConfigRecord>> {
        let key = assemble_instance_config_key(instance_id, config_app_id, config_namespace);
        match self.instance_configs.get(key.as_bytes())? {
            Some(value) => Ok(Some(bincode::deserialize(&value)?)),
            None => Ok(None),
        }
    }

    async fn create_instance_config(
        &self,
        record: &InstanceConfigRecord,
    ) -> Result<()> {
        let key = assemble_instance_config_key(
            record.instance_id,
            &record.config_app_id,
            &record.config_namespace_name,
        );
        let bytes = bincode::serialize(record)?;

        match self
            .instance_configs
            .compare_and_swap(key.as_bytes(), None as Option<&[u8]>, Some(bytes))?
        {
            Ok(()) => Ok(()),
            Err(_) => Err(StorageError::ConstraintViolation { key }.into()),
        }
    }

    async fn update_instance_config(
        &self,
        record: &InstanceConfigRecord,
    ) -> Result<()> {
        let key = assemble_instance_config_key(
            record.instance_id,
            &record.config_app_id,
            &record.config_namespace_name,
        );
        let bytes = bincode::serialize(record)?;
        self.instance_configs.insert(key.as_bytes(), bytes)?;
        Ok(())
    }
}
