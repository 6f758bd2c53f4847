mod backups;
mod lifecycle;
mod recycle_bin;
