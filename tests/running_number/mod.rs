mod allocation;
mod concurrency;
